// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic zone: the recent conversation quoted back to the model.

use gradient_core::{Message, Role};

/// Formats the tail of a chat's history as plain-text context.
#[derive(Debug, Clone, Copy)]
pub struct DynamicZone {
    window: usize,
}

impl DynamicZone {
    /// `window` is the number of most recent messages kept.
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// The last `window` messages as `User: ...` / `Assistant: ...` blocks.
    ///
    /// Returns `None` when there is nothing to quote.
    pub fn render(&self, history: &[Message]) -> Option<String> {
        if self.window == 0 || history.is_empty() {
            return None;
        }

        let start = history.len().saturating_sub(self.window);
        let turns = history[start..]
            .iter()
            .map(|message| {
                let speaker = match message.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                };
                format!("{speaker}: {}", message.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Some(format!(
            "Previous conversation context:\n{turns}\n\nCurrent user message:"
        ))
    }
}
