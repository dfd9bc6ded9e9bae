// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation persistence for the Gradient learning assistant.
//!
//! Two [`ConversationStore`](gradient_core::ConversationStore) implementations:
//! [`SqliteStore`], a WAL-mode SQLite database with embedded migrations and
//! a single-writer connection via `tokio-rusqlite`, and [`InMemoryStore`].

pub mod adapter;
pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;

use std::sync::Arc;

use gradient_config::model::{StorageBackend, StorageConfig};
use gradient_core::{ConversationStore, GradientError};
use tracing::info;

pub use adapter::SqliteStore;
pub use database::Database;
pub use memory::InMemoryStore;

/// Builds and initializes the store selected by `config.backend`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn ConversationStore>, GradientError> {
    let store: Arc<dyn ConversationStore> = match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStore::new(config.clone())),
        StorageBackend::Memory => Arc::new(InMemoryStore::new()),
    };
    store.initialize().await?;
    info!(backend = store.name(), "conversation store ready");
    Ok(store)
}
