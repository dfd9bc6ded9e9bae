// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes.

use chrono::{DateTime, SecondsFormat, Utc};
use gradient_core::GradientError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Handle to one open SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and migrates it.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, GradientError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(GradientError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(GradientError::storage)?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                let _mode: String =
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            }
            conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| run_migrations(conn))
            .await
            .map_err(GradientError::storage)?;

        debug!(path, wal_mode, "database opened and migrated");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}

/// Maps a tokio-rusqlite failure into the storage error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> GradientError {
    GradientError::storage(e)
}

/// Fixed-width RFC 3339 text, so string order equals time order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("gradient.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('chats', 'messages') ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        assert_eq!(tables, ["chats", "messages"]);
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gradient.db");
        let path = path.to_str().unwrap();
        drop(Database::open(path, true).await.unwrap());
        Database::open(path, true).await.unwrap();
    }

    #[test]
    fn timestamps_round_trip_with_nanos() {
        let now = Utc::now();
        let text = format_timestamp(&now);
        assert!(text.ends_with('Z'));
        assert_eq!(parse_timestamp(0, &text).unwrap(), now);
    }

    #[test]
    fn bad_timestamp_is_a_conversion_error() {
        assert!(parse_timestamp(3, "yesterday").is_err());
    }
}
