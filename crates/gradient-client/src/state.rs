// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folding stream events into the in-flight assistant message.

use gradient_core::{Material, MessagePatch, StreamEvent};

/// Shown when the connection fails before the stream finishes.
pub const TRANSPORT_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Accumulated state of one streamed reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyState {
    chat_id: Option<String>,
    content: String,
    recommendations: Vec<Material>,
    failed: bool,
    complete: bool,
}

impl ReplyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event and returns the cumulative patch for the message.
    ///
    /// The patch carries the full content so far, never a delta.
    pub fn apply(&mut self, event: &StreamEvent) -> MessagePatch {
        match event {
            StreamEvent::Start {
                chat_id,
                recommendations,
            } => {
                self.chat_id = Some(chat_id.clone());
                self.recommendations.clone_from(recommendations);
            }
            StreamEvent::Content { content } => self.content.push_str(content),
            StreamEvent::Error { content } => {
                self.content.clone_from(content);
                self.failed = true;
            }
            StreamEvent::Complete => self.complete = true,
        }
        self.patch()
    }

    pub fn patch(&self) -> MessagePatch {
        MessagePatch {
            content: Some(self.content.clone()),
            recommendations: Some(self.recommendations.clone()),
        }
    }

    /// Chat id announced by the server in the `start` event.
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn recommendations(&self) -> &[Material] {
        &self.recommendations
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
