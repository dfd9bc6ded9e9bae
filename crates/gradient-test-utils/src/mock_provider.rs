// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted generation provider for deterministic testing.
//!
//! `MockProvider` implements `GenerationProvider` with pre-configured
//! replies, enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;

use gradient_core::{
    AdapterType, ChunkStream, GenerationChunk, GenerationProvider, GenerationRequest,
    GradientError, HealthStatus, PluginAdapter,
};

/// Text returned when the reply queue is empty.
pub const DEFAULT_REPLY: &str = "mock response";

/// One scripted generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Streams the chunks in order, then `Done`.
    Chunks(Vec<String>),
    /// Streams the chunks, then `Failed(reason)`.
    FailAfter { chunks: Vec<String>, reason: String },
    /// `stream()` itself returns a provider error.
    FailToOpen(String),
    /// Streams the chunks, then never yields again.
    Hang(Vec<String>),
}

impl Reply {
    /// A reply streamed as a single chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Chunks(vec![text.into()])
    }

    /// A reply streamed in the given pieces.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Reply::Chunks(chunks.into_iter().map(Into::into).collect())
    }
}

fn text_chunks(chunks: Vec<String>) -> impl futures::Stream<Item = GenerationChunk> + Send {
    stream::iter(chunks.into_iter().map(GenerationChunk::Text))
}

/// A mock provider that replays scripted replies and records every request.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// [`DEFAULT_REPLY`] is streamed.
#[derive(Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::default(),
        }
    }

    pub async fn push_reply(&self, reply: Reply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self) -> Reply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Reply::text(DEFAULT_REPLY))
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, GradientError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GradientError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn stream(&self, request: GenerationRequest) -> Result<ChunkStream, GradientError> {
        self.requests.lock().await.push(request);

        let stream: ChunkStream = match self.next_reply().await {
            Reply::Chunks(chunks) => {
                Box::pin(text_chunks(chunks).chain(stream::once(async { GenerationChunk::Done })))
            }
            Reply::FailAfter { chunks, reason } => Box::pin(
                text_chunks(chunks)
                    .chain(stream::once(async move { GenerationChunk::Failed(reason) })),
            ),
            Reply::FailToOpen(message) => {
                return Err(GradientError::Provider {
                    message,
                    source: None,
                });
            }
            Reply::Hang(chunks) => Box::pin(text_chunks(chunks).chain(stream::pending())),
        };
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            system_instruction: String::new(),
            prompt: prompt.into(),
            image: None,
        }
    }

    async fn collect(provider: &MockProvider) -> Vec<GenerationChunk> {
        provider.stream(request("q")).await.unwrap().collect().await
    }

    #[tokio::test]
    async fn default_reply_when_queue_empty() {
        let provider = MockProvider::new();
        assert_eq!(
            collect(&provider).await,
            vec![GenerationChunk::Text(DEFAULT_REPLY.into()), GenerationChunk::Done]
        );
    }

    #[tokio::test]
    async fn queued_replies_returned_in_order() {
        let provider = MockProvider::with_replies(vec![
            Reply::chunks(["a", "b"]),
            Reply::FailAfter {
                chunks: vec!["c".into()],
                reason: "boom".into(),
            },
        ]);

        assert_eq!(
            collect(&provider).await,
            vec![
                GenerationChunk::Text("a".into()),
                GenerationChunk::Text("b".into()),
                GenerationChunk::Done
            ]
        );
        assert_eq!(
            collect(&provider).await,
            vec![
                GenerationChunk::Text("c".into()),
                GenerationChunk::Failed("boom".into())
            ]
        );
    }

    #[tokio::test]
    async fn fail_to_open_is_an_error() {
        let provider = MockProvider::with_replies(vec![Reply::FailToOpen("503".into())]);
        assert!(provider.stream(request("q")).await.is_err());
    }

    #[tokio::test]
    async fn requests_are_recorded() {
        let provider = MockProvider::new();
        let _ = provider.stream(request("first")).await.unwrap();
        provider.push_reply(Reply::text("x")).await;
        let _ = provider.stream(request("second")).await.unwrap();

        let prompts: Vec<String> = provider
            .requests()
            .await
            .into_iter()
            .map(|r| r.prompt)
            .collect();
        assert_eq!(prompts, ["first", "second"]);
    }
}
