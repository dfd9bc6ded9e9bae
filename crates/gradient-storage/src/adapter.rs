// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use gradient_config::model::StorageConfig;
use gradient_core::{
    AdapterType, Chat, ConversationStore, GradientError, HealthStatus, Message, MessagePatch,
    PluginAdapter,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed conversation store.
///
/// The database is opened by [`ConversationStore::initialize`]; every other
/// operation fails until then.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, GradientError> {
        self.db.get().ok_or_else(|| GradientError::Storage {
            source: "storage not initialized, call initialize() first".into(),
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), GradientError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, GradientError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GradientError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn initialize(&self) -> Result<(), GradientError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| GradientError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite conversation store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), GradientError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn create_chat(&self, chat: &Chat) -> Result<(), GradientError> {
        queries::chats::create_chat(self.db()?, chat).await
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, GradientError> {
        queries::chats::get_chat(self.db()?, chat_id).await
    }

    async fn list_chats(&self) -> Result<Vec<Chat>, GradientError> {
        queries::chats::list_chats(self.db()?).await
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<bool, GradientError> {
        queries::chats::delete_chat(self.db()?, chat_id).await
    }

    async fn append(&self, chat_id: &str, message: Message) -> Result<Message, GradientError> {
        queries::messages::append_message(self.db()?, chat_id, message).await
    }

    async fn list(&self, chat_id: &str) -> Result<Vec<Message>, GradientError> {
        queries::messages::list_messages(self.db()?, chat_id).await
    }

    async fn update(
        &self,
        chat_id: &str,
        message_id: &str,
        patch: &MessagePatch,
    ) -> Result<(), GradientError> {
        queries::messages::update_message(self.db()?, chat_id, message_id, patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradient_config::model::StorageBackend;
    use gradient_core::Role;
    use tempfile::tempdir;

    fn make_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Sqlite,
            database_path: path.to_string_lossy().into_owned(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("test.db")));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(&db_path));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("double.db")));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_requires_initialize() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("health.db")));

        assert!(store.health_check().await.is_err());
        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn chat_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("lifecycle.db")));
        store.initialize().await.unwrap();

        store.create_chat(&Chat::new("c1")).await.unwrap();
        store
            .append("c1", Message::new("m1", "c1", Role::User, "Jelaskan vektor"))
            .await
            .unwrap();
        store
            .append("c1", Message::new("m2", "c1", Role::Assistant, ""))
            .await
            .unwrap();
        store
            .update("c1", "m2", &MessagePatch::content("Vektor adalah ..."))
            .await
            .unwrap();

        let messages = store.list("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Vektor adalah ...");
        assert_eq!(
            store.get_chat("c1").await.unwrap().unwrap().title,
            "Jelaskan vektor"
        );

        assert!(store.delete_chat("c1").await.unwrap());
        assert!(store.list_chats().await.unwrap().is_empty());

        store.close().await.unwrap();
        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("durable.db");
        {
            let store = SqliteStore::new(make_config(&path));
            store.initialize().await.unwrap();
            store.create_chat(&Chat::new("c1")).await.unwrap();
            store
                .append("c1", Message::new("m1", "c1", Role::User, "halo"))
                .await
                .unwrap();
            store.close().await.unwrap();
        }

        let store = SqliteStore::new(make_config(&path));
        store.initialize().await.unwrap();
        assert_eq!(store.list("c1").await.unwrap().len(), 1);
    }
}
