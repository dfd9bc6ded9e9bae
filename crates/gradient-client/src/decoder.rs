// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental decoder for the send-message event stream.

use gradient_core::StreamEvent;
use tracing::warn;

/// Longest unterminated line kept in memory. Anything longer is dropped up
/// to its next newline.
pub const MAX_PENDING_BYTES: usize = 1024 * 1024;

/// Splits a byte stream into lines and parses `data:` lines as events.
///
/// Bytes are buffered until a newline arrives, so frames (and multi-byte
/// characters) split across reads decode correctly. Blank lines, comments
/// and other SSE fields are ignored; malformed frames are logged and skipped.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    /// Inside an oversized line; skip until its newline.
    discarding: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds `bytes` and returns every event completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let mut bytes = bytes;
        if self.discarding {
            let Some(newline) = bytes.iter().position(|&b| b == b'\n') else {
                return events;
            };
            self.discarding = false;
            bytes = &bytes[newline + 1..];
        }

        // The buffered tail holds no newline, so only new bytes need scanning.
        let mut scan = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        let mut start = 0;
        while let Some(offset) = self.buffer[scan..].iter().position(|&b| b == b'\n') {
            let newline = scan + offset;
            if let Some(event) = parse_line(&self.buffer[start..newline]) {
                events.push(event);
            }
            start = newline + 1;
            scan = start;
        }
        self.buffer.drain(..start);

        if self.buffer.len() > MAX_PENDING_BYTES {
            warn!(
                pending = self.buffer.len(),
                limit = MAX_PENDING_BYTES,
                "dropping oversized frame"
            );
            self.buffer.clear();
            self.discarding = true;
        }
        events
    }

    /// Parses whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        if std::mem::take(&mut self.discarding) {
            return None;
        }
        parse_line(&rest)
    }

    /// Bytes waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn parse_line(raw: &[u8]) -> Option<StreamEvent> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "skipping frame with invalid UTF-8");
            return None;
        }
    };
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        return None;
    }

    match serde_json::from_str(data) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, frame = data, "skipping malformed frame");
            None
        }
    }
}
