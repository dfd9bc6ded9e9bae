// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for Gemini `streamGenerateContent?alt=sse` responses.
//!
//! Converts a reqwest response byte stream into [`GenerationChunk`]s using
//! the `eventsource-stream` crate. The resulting stream ends after the first
//! `Done` or `Failed`.

use std::fmt::Display;

use eventsource_stream::{Event, Eventsource};
use futures::stream::{self, Stream, StreamExt};
use gradient_core::{ChunkStream, GenerationChunk};
use tracing::{debug, warn};

use crate::types::GenerateContentResponse;

/// Finish reasons that mean the model refused to produce the text.
pub const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// What a single SSE payload contributes to the chunk stream.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Payload {
    Text(String),
    Failed(String),
    /// Metadata-only payloads (usage, a bare `STOP`).
    Skip,
}

/// Classifies one `data:` payload.
pub(crate) fn classify(data: &str) -> Payload {
    let data = data.trim();
    if data.is_empty() {
        return Payload::Skip;
    }

    let response: GenerateContentResponse = match serde_json::from_str(data) {
        Ok(response) => response,
        Err(e) => return Payload::Failed(format!("failed to parse stream payload: {e}")),
    };

    if let Some(error) = response.error {
        return Payload::Failed(format!(
            "Gemini API error {} ({}): {}",
            error.code, error.status, error.message
        ));
    }

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Payload::Failed(format!("prompt blocked: {reason}"));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Payload::Skip;
    };

    if let Some(text) = candidate.content.as_ref().and_then(|c| c.text()) {
        return Payload::Text(text);
    }

    match candidate.finish_reason.as_deref() {
        Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason) => {
            Payload::Failed(format!("response blocked: {reason}"))
        }
        _ => Payload::Skip,
    }
}

/// Folds a stream of parsed SSE events into generation chunks.
pub(crate) fn chunks_from_events<S, E>(events: S) -> ChunkStream
where
    S: Stream<Item = Result<Event, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let events = Box::pin(events);
    let chunks = stream::unfold(Some(events), |state| async move {
        let mut events = state?;
        loop {
            match events.next().await {
                None => return Some((GenerationChunk::Done, None)),
                Some(Err(e)) => {
                    warn!(error = %e, "Gemini SSE transport error");
                    return Some((GenerationChunk::Failed(format!("SSE stream error: {e}")), None));
                }
                Some(Ok(event)) => match classify(&event.data) {
                    Payload::Text(text) => return Some((GenerationChunk::Text(text), Some(events))),
                    Payload::Failed(reason) => {
                        return Some((GenerationChunk::Failed(reason), None));
                    }
                    Payload::Skip => debug!("skipping metadata-only payload"),
                },
            }
        }
    });
    Box::pin(chunks)
}

/// Parses a streaming HTTP response into a [`ChunkStream`].
///
/// Dropping the returned stream drops the response body and releases the
/// connection.
pub fn parse_sse_stream(response: reqwest::Response) -> ChunkStream {
    chunks_from_events(response.bytes_stream().eventsource())
}
