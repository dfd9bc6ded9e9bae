// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat CRUD operations.

use gradient_core::{Chat, GradientError};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, format_timestamp, map_tr_err, parse_timestamp};

fn chat_from_row(row: &Row<'_>) -> Result<Chat, rusqlite::Error> {
    let created_at: String = row.get(2)?;
    Ok(Chat {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: parse_timestamp(2, &created_at)?,
    })
}

/// Insert a new chat.
pub async fn create_chat(db: &Database, chat: &Chat) -> Result<(), GradientError> {
    let chat = chat.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO chats (id, title, created_at) VALUES (?1, ?2, ?3)",
                params![chat.id, chat.title, format_timestamp(&chat.created_at)],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a chat by id.
pub async fn get_chat(db: &Database, id: &str) -> Result<Option<Chat>, GradientError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Chat>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, title, created_at FROM chats WHERE id = ?1",
                params![id],
                chat_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All chats, newest first.
pub async fn list_chats(db: &Database) -> Result<Vec<Chat>, GradientError> {
    db.connection()
        .call(|conn| -> Result<Vec<Chat>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, title, created_at FROM chats ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map([], chat_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a chat; its messages go with it through the foreign key cascade.
pub async fn delete_chat(db: &Database, id: &str) -> Result<bool, GradientError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let removed = conn.execute("DELETE FROM chats WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_and_get_chat() {
        let (db, _dir) = setup_db().await;
        let chat = Chat::new("chat-1");
        create_chat(&db, &chat).await.unwrap();

        let fetched = get_chat(&db, "chat-1").await.unwrap().unwrap();
        assert_eq!(fetched, chat);
        assert!(get_chat(&db, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_chat(&db, &Chat::new("dup")).await.unwrap();
        assert!(create_chat(&db, &Chat::new("dup")).await.is_err());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (db, _dir) = setup_db().await;
        let mut older = Chat::new("older");
        older.created_at = Utc::now() - Duration::minutes(5);
        create_chat(&db, &older).await.unwrap();
        create_chat(&db, &Chat::new("newer")).await.unwrap();

        let ids: Vec<String> = list_chats(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, ["newer", "older"]);
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let (db, _dir) = setup_db().await;
        create_chat(&db, &Chat::new("gone")).await.unwrap();
        assert!(delete_chat(&db, "gone").await.unwrap());
        assert!(!delete_chat(&db, "gone").await.unwrap());
    }
}
