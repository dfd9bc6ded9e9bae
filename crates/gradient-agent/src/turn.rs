// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream phase of a single assistant turn.
//!
//! A turn goes through `Start -> Streaming -> Complete`, or through
//! `Start -> Error -> Complete` when generation fails. Failures are absorbed:
//! the client always sees a `complete` event unless it disconnected first.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use gradient_core::{
    ConversationStore, GenerationChunk, GenerationProvider, GenerationRequest, GradientError,
    Material, MessagePatch, StreamEvent,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::apology::apology_for;
use crate::locks::ChatGuard;

/// States of the per-turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Recommendations computed, nothing sent yet.
    Start,
    /// Relaying generation chunks.
    Streaming,
    /// Generation failed; the apology replaces the reply.
    Error,
    /// Terminal sentinel sent.
    Complete,
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Start => write!(f, "start"),
            TurnState::Streaming => write!(f, "streaming"),
            TurnState::Error => write!(f, "error"),
            TurnState::Complete => write!(f, "complete"),
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Generation finished; `chunks` non-empty deltas were relayed.
    Completed { chunks: usize },
    /// Generation failed and the apology was delivered in its place.
    Recovered { reason: String },
    /// The receiver went away. Stored content is kept as is.
    Cancelled { chunks: usize },
}

enum Relay {
    Finished,
    Failed(String),
    Cancelled,
}

/// A prepared assistant turn, returned by
/// [`ChatService::begin`](crate::ChatService::begin).
///
/// Holds the chat's lock until it is run to completion or dropped.
pub struct ChatTurn {
    chat_id: String,
    assistant_id: String,
    recommendations: Vec<Material>,
    request: GenerationRequest,
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn GenerationProvider>,
    timeout: Duration,
    state: TurnState,
    content: String,
    chunks: usize,
    _chat_guard: ChatGuard,
}

impl ChatTurn {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        chat_id: String,
        assistant_id: String,
        recommendations: Vec<Material>,
        request: GenerationRequest,
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn GenerationProvider>,
        timeout: Duration,
        chat_guard: ChatGuard,
    ) -> Self {
        Self {
            chat_id,
            assistant_id,
            recommendations,
            request,
            store,
            provider,
            timeout,
            state: TurnState::Start,
            content: String::new(),
            chunks: 0,
            _chat_guard: chat_guard,
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Id of the stored assistant message this turn fills in.
    pub fn assistant_message_id(&self) -> &str {
        &self.assistant_id
    }

    pub fn recommendations(&self) -> &[Material] {
        &self.recommendations
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    fn transition(&mut self, next: TurnState) {
        debug!(chat_id = %self.chat_id, from = %self.state, to = %next, "turn state change");
        self.state = next;
    }

    /// Runs the stream phase, sending events through `events`.
    ///
    /// The channel should be bounded: a full channel pauses the generation
    /// pull. Dropping the receiver cancels the turn.
    pub async fn run(mut self, events: mpsc::Sender<StreamEvent>) -> TurnOutcome {
        let started = Instant::now();
        info!(
            chat_id = %self.chat_id,
            recommendations = self.recommendations.len(),
            with_image = self.request.image.is_some(),
            "turn started"
        );

        let start = StreamEvent::Start {
            chat_id: self.chat_id.clone(),
            recommendations: self.recommendations.clone(),
        };
        if events.send(start).await.is_err() {
            return self.cancelled();
        }

        let relay = tokio::time::timeout(self.timeout, self.relay(&events))
            .await
            .unwrap_or_else(|_| {
                Relay::Failed(
                    GradientError::Timeout {
                        duration: self.timeout,
                    }
                    .to_string(),
                )
            });

        let failure = match relay {
            Relay::Finished => None,
            Relay::Cancelled => return self.cancelled(),
            Relay::Failed(reason) => {
                self.transition(TurnState::Error);
                let apology = apology_for(&reason, self.request.image.is_some());
                warn!(
                    chat_id = %self.chat_id,
                    error = %reason,
                    discarded_chars = self.content.chars().count(),
                    "generation failed, replacing reply with apology"
                );

                self.content = apology.to_string();
                if let Err(e) = self
                    .store
                    .update(&self.chat_id, &self.assistant_id, &MessagePatch::content(apology))
                    .await
                {
                    error!(chat_id = %self.chat_id, error = %e, "failed to store apology");
                }

                let event = StreamEvent::Error {
                    content: apology.to_string(),
                };
                if events.send(event).await.is_err() {
                    return self.cancelled();
                }
                Some(reason)
            }
        };

        self.transition(TurnState::Complete);
        if events.send(StreamEvent::Complete).await.is_err() {
            return self.cancelled();
        }

        info!(
            chat_id = %self.chat_id,
            chunks = self.chunks,
            chars = self.content.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "turn complete"
        );

        match failure {
            Some(reason) => TurnOutcome::Recovered { reason },
            None => TurnOutcome::Completed {
                chunks: self.chunks,
            },
        }
    }

    /// Pulls generation chunks and relays them until the stream ends.
    async fn relay(&mut self, events: &mpsc::Sender<StreamEvent>) -> Relay {
        let opened = tokio::select! {
            biased;
            () = events.closed() => return Relay::Cancelled,
            opened = self.provider.stream(self.request.clone()) => opened,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => return Relay::Failed(e.to_string()),
        };
        self.transition(TurnState::Streaming);

        loop {
            let next = tokio::select! {
                biased;
                () = events.closed() => return Relay::Cancelled,
                next = stream.next() => next,
            };

            match next {
                Some(GenerationChunk::Text(text)) => {
                    if text.is_empty() {
                        continue;
                    }
                    self.content.push_str(&text);
                    self.chunks += 1;

                    let patch = MessagePatch::content(self.content.clone());
                    if let Err(e) = self
                        .store
                        .update(&self.chat_id, &self.assistant_id, &patch)
                        .await
                    {
                        return Relay::Failed(format!("failed to store reply: {e}"));
                    }

                    if events.send(StreamEvent::Content { content: text }).await.is_err() {
                        return Relay::Cancelled;
                    }
                }
                Some(GenerationChunk::Failed(reason)) => return Relay::Failed(reason),
                Some(GenerationChunk::Done) | None => return Relay::Finished,
            }
        }
    }

    fn cancelled(&self) -> TurnOutcome {
        info!(
            chat_id = %self.chat_id,
            chunks = self.chunks,
            state = %self.state,
            "client disconnected, turn cancelled"
        );
        TurnOutcome::Cancelled {
            chunks: self.chunks,
        }
    }
}
