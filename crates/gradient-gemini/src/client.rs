// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini generative language API.
//!
//! Provides [`GeminiClient`] which handles request construction,
//! authentication, streaming SSE responses, and transient error retry.

use std::time::Duration;

use gradient_core::{ChunkStream, GradientError};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::sse;
use crate::types::{ApiErrorResponse, GenerateContentRequest};

/// HTTP client for Gemini API communication.
///
/// Manages the API key header, connection pooling, and retry logic for
/// transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        model: String,
        base_url: &str,
        max_retries: u32,
    ) -> Result<Self, GradientError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| GradientError::Config(format!("invalid API key header value: {e}")))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| GradientError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            retry_delay: Duration::from_secs(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self.retry_delay = Duration::from_millis(10);
        self
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    /// Sends a streaming request and returns the chunk stream.
    ///
    /// Transient statuses are retried up to `max_retries` times before the
    /// stream opens. Once the stream is open nothing is retried.
    pub async fn stream_generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream, GradientError> {
        let url = self.stream_url();
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying streaming request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| GradientError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, model = %self.model, "streaming response received");

            if status.is_success() {
                return Ok(sse::parse_sse_stream(response));
            }

            let body = response.text().await.unwrap_or_default();
            let error = GradientError::Provider {
                message: describe_error(status, &body),
                source: None,
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(error);
                continue;
            }

            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| GradientError::Provider {
            message: "streaming request failed after retries".into(),
            source: None,
        }))
    }
}

/// Formats a non-2xx response. The numeric status is always included.
fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!(
            "Gemini API returned {status} ({}): {}",
            api_err.error.status, api_err.error.message
        ),
        Err(_) => format!("Gemini API returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
