// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static zone: the system instruction sent with every turn.

use gradient_config::model::AssistantConfig;
use gradient_core::GradientError;
use tracing::{info, warn};

/// Instruction used when neither a prompt file nor an inline prompt is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful learning assistant. You help students understand academic concepts and provide educational guidance.

Instructions:
- Always respond in Indonesian (Bahasa Indonesia)
- Be educational and encouraging
- Reference previous conversation when relevant
- When users refer to \"itu\" (that), \"ini\" (this), or similar pronouns, understand them in context of the previous conversation
- Provide clear explanations with examples when possible
- When recommending materials, mention them naturally in your response";

/// Holds the loaded system instruction.
#[derive(Debug, Clone)]
pub struct StaticZone {
    system_prompt: String,
}

impl StaticZone {
    /// Loads the system prompt from config.
    ///
    /// # Priority
    /// 1. `config.system_prompt_file` read from disk
    /// 2. `config.system_prompt` inline string
    /// 3. [`DEFAULT_SYSTEM_PROMPT`]
    pub async fn new(config: &AssistantConfig) -> Result<Self, GradientError> {
        let system_prompt = load_system_prompt(config).await?;
        Ok(Self { system_prompt })
    }

    /// A zone with a fixed prompt, bypassing config.
    pub fn from_prompt(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

impl Default for StaticZone {
    fn default() -> Self {
        Self::from_prompt(DEFAULT_SYSTEM_PROMPT)
    }
}

async fn load_system_prompt(config: &AssistantConfig) -> Result<String, GradientError> {
    if let Some(ref file_path) = config.system_prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(path = file_path.as_str(), "loaded system prompt from file");
                    return Ok(trimmed.to_string());
                }
                warn!(path = file_path.as_str(), "system prompt file is empty, falling back");
            }
            Err(e) => {
                warn!(
                    path = file_path.as_str(),
                    error = %e,
                    "failed to read system prompt file, falling back"
                );
            }
        }
    }

    if let Some(ref prompt) = config.system_prompt
        && !prompt.trim().is_empty()
    {
        return Ok(prompt.clone());
    }

    Ok(DEFAULT_SYSTEM_PROMPT.to_string())
}
