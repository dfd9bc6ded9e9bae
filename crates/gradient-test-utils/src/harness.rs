// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete [`ChatService`] with a scripted
//! provider, the built-in catalog, and either an in-memory store or a
//! SQLite database in a temp directory. `send()` drives a full turn.

use std::sync::Arc;

use gradient_agent::{ChatService, SendMessage, TurnOutcome, TurnSettings};
use gradient_config::model::{StorageBackend, StorageConfig};
use gradient_config::GradientConfig;
use gradient_context::ContextEngine;
use gradient_core::{ConversationStore, GradientError, StreamEvent};
use gradient_recommend::{Catalog, Recommender};
use gradient_storage::open_store;
use tokio::sync::mpsc;

use crate::mock_provider::{MockProvider, Reply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<Reply>,
    backend: StorageBackend,
    settings: TurnSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            backend: StorageBackend::Memory,
            settings: TurnSettings::default(),
        }
    }

    /// Set scripted provider replies.
    pub fn with_replies(mut self, replies: Vec<Reply>) -> Self {
        self.replies = replies;
        self
    }

    /// Use a SQLite database in a temp directory instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.backend = StorageBackend::Sqlite;
        self
    }

    pub fn with_settings(mut self, settings: TurnSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, GradientError> {
        let temp_dir = tempfile::TempDir::new().map_err(GradientError::storage)?;
        let storage = StorageConfig {
            backend: self.backend,
            database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let store = open_store(&storage).await?;

        let config = GradientConfig {
            storage,
            ..GradientConfig::default()
        };

        let provider = MockProvider::with_replies(self.replies);
        let recommender = Recommender::new(Catalog::builtin()?, config.recommend.default_limit);
        let service = ChatService::new(
            Arc::clone(&store),
            Arc::new(provider.clone()),
            Arc::new(recommender),
            Arc::new(ContextEngine::default()),
            self.settings,
        );

        Ok(TestHarness {
            service: Arc::new(service),
            provider,
            store,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// Everything one completed send produced.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub chat_id: String,
    pub events: Vec<StreamEvent>,
    pub outcome: TurnOutcome,
}

impl Exchange {
    /// The reply as a client would render it: content appends, error replaces.
    pub fn reply(&self) -> String {
        let mut reply = String::new();
        for event in &self.events {
            match event {
                StreamEvent::Content { content } => reply.push_str(content),
                StreamEvent::Error { content } => reply.clone_from(content),
                StreamEvent::Start { .. } | StreamEvent::Complete => {}
            }
        }
        reply
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(StreamEvent::kind).collect()
    }
}

/// A complete test environment with a mock provider and temp storage.
pub struct TestHarness {
    pub service: Arc<ChatService>,
    /// Shares its reply queue and request log with the service's provider.
    pub provider: MockProvider,
    pub store: Arc<dyn ConversationStore>,
    pub config: GradientConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Runs one send to completion and collects every event.
    pub async fn send(&self, request: SendMessage) -> Result<Exchange, GradientError> {
        let turn = self.service.begin(request).await?;
        let chat_id = turn.chat_id().to_string();

        let (tx, mut rx) = mpsc::channel(self.config.server.stream_buffer);
        let collector = tokio::spawn(async move {
            let mut events = Vec::new();
            while let Some(event) = rx.recv().await {
                events.push(event);
            }
            events
        });

        let outcome = turn.run(tx).await;
        let events = collector
            .await
            .map_err(|e| GradientError::Internal(format!("event collector panicked: {e}")))?;

        Ok(Exchange {
            chat_id,
            events,
            outcome,
        })
    }
}
