// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events relayed to the client over the send-message stream.

use serde::{Deserialize, Serialize};

use crate::types::Material;

/// One frame of a streamed assistant reply.
///
/// A well-formed stream is `Start`, then any number of `Content`, then at
/// most one `Error`, then exactly one `Complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Start {
        #[serde(rename = "chatId")]
        chat_id: String,
        recommendations: Vec<Material>,
    },
    Content {
        content: String,
    },
    /// Supersedes every `Content` event relayed before it.
    ///
    /// Clients fold the stream by appending `Content` and replacing on
    /// `Error`; the folded text then equals the stored assistant message,
    /// which holds the apology rather than the partial reply.
    Error {
        content: String,
    },
    Complete,
}

impl StreamEvent {
    /// The `type` discriminator as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "start",
            StreamEvent::Content { .. } => "content",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Complete => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete)
    }
}
