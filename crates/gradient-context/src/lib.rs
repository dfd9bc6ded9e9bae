// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Three-zone prompt assembly for Gradient generation requests.
//!
//! - **Static zone**: the system instruction (file, inline, or default)
//! - **Dynamic zone**: the most recent turns of the chat
//! - **Conditional zone**: the materials recommended for this turn
//!
//! The [`ContextEngine`] combines them into a [`GenerationRequest`].

pub mod conditional;
pub mod dynamic;
pub mod static_zone;

use gradient_config::model::AssistantConfig;
use gradient_core::{GenerationRequest, GradientError, InlineImage, Material, Message};

pub use conditional::materials_block;
pub use dynamic::DynamicZone;
pub use static_zone::{DEFAULT_SYSTEM_PROMPT, StaticZone};

/// Final line of every prompt.
pub const CLOSING_INSTRUCTION: &str =
    "Please provide a helpful, educational response that maintains context from our conversation.";

/// Builds generation requests for assistant turns.
#[derive(Debug, Clone)]
pub struct ContextEngine {
    static_zone: StaticZone,
    dynamic_zone: DynamicZone,
}

impl ContextEngine {
    /// Loads the static zone and sizes the dynamic zone from config.
    pub async fn new(config: &AssistantConfig) -> Result<Self, GradientError> {
        Ok(Self {
            static_zone: StaticZone::new(config).await?,
            dynamic_zone: DynamicZone::new(config.history_window),
        })
    }

    pub fn from_parts(static_zone: StaticZone, dynamic_zone: DynamicZone) -> Self {
        Self {
            static_zone,
            dynamic_zone,
        }
    }

    pub fn system_prompt(&self) -> &str {
        self.static_zone.system_prompt()
    }

    /// Assembles the request for one user turn.
    ///
    /// `history` holds the messages before `message`; the current turn is
    /// never part of it.
    pub fn assemble(
        &self,
        message: &str,
        history: &[Message],
        materials: &[Material],
        image: Option<InlineImage>,
    ) -> GenerationRequest {
        let mut prompt = String::new();

        if let Some(conversation) = self.dynamic_zone.render(history) {
            prompt.push_str(&conversation);
            prompt.push('\n');
        }

        prompt.push_str(message);
        prompt.push_str("\n\n");

        if let Some(block) = materials_block(materials) {
            prompt.push_str(&block);
            prompt.push_str("\n\n");
        }

        prompt.push_str(CLOSING_INSTRUCTION);

        GenerationRequest {
            system_instruction: self.static_zone.system_prompt().to_string(),
            prompt,
            image,
        }
    }
}

impl Default for ContextEngine {
    fn default() -> Self {
        Self::from_parts(StaticZone::default(), DynamicZone::new(6))
    }
}
