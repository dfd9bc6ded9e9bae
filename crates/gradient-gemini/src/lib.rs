// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini generation provider for the Gradient learning assistant.
//!
//! Implements [`GenerationProvider`] over the streaming
//! `streamGenerateContent` endpoint, including multimodal (inline image)
//! requests.

pub mod client;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use gradient_config::model::GeminiConfig;
use gradient_core::{
    AdapterType, ChunkStream, GenerationProvider, GenerationRequest, GradientError, HealthStatus,
    PluginAdapter,
};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part, SafetySetting};

/// Harm categories every request sets a threshold for.
pub const HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini provider implementing [`GenerationProvider`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiProvider {
    client: GeminiClient,
    safety_threshold: String,
    generation_config: Option<GenerationConfig>,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig) -> Result<Self, GradientError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = GeminiClient::new(
            &api_key,
            config.model.clone(),
            &config.base_url,
            config.max_retries,
        )?;

        info!(model = %config.model, "Gemini provider initialized");
        Ok(Self::with_client(client, config))
    }

    fn with_client(client: GeminiClient, config: &GeminiConfig) -> Self {
        let generation_config = (config.max_output_tokens.is_some()
            || config.temperature.is_some())
        .then(|| GenerationConfig {
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        });

        Self {
            client,
            safety_threshold: config.safety_threshold.clone(),
            generation_config,
        }
    }

    /// Builds the API request. The image part, when present, precedes the text.
    fn to_api_request(&self, request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &request.image {
            parts.push(Part::inline(&image.mime_type, &image.data));
        }
        parts.push(Part::text(&request.prompt));

        let system_instruction = (!request.system_instruction.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::text(&request.system_instruction)],
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            system_instruction,
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: (*category).to_string(),
                    threshold: self.safety_threshold.clone(),
                })
                .collect(),
            generation_config: self.generation_config.clone(),
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, GradientError> {
        // No API call: a test request would spend quota.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GradientError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn stream(&self, request: GenerationRequest) -> Result<ChunkStream, GradientError> {
        let api_request = self.to_api_request(&request);
        debug!(
            model = self.client.model(),
            with_image = request.image.is_some(),
            prompt_len = request.prompt.len(),
            "opening generation stream"
        );
        self.client.stream_generate(&api_request).await
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: Option<&str>) -> Result<String, GradientError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            GradientError::Config(
                "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
            )
        })
}
