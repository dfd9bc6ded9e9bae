// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message append, listing, and in-place update.

use std::str::FromStr;

use gradient_core::{
    GradientError, Material, Message, MessagePatch, Role, derive_chat_title, next_created_at,
};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, format_timestamp, map_tr_err, parse_timestamp};

const SELECT_COLUMNS: &str =
    "SELECT id, chat_id, role, content, image_url, recommendations, created_at FROM messages";

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn message_from_row(row: &Row<'_>) -> Result<Message, rusqlite::Error> {
    let role: String = row.get(2)?;
    let recommendations: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    Ok(Message {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        role: Role::from_str(&role).map_err(|e| conversion_err(2, e))?,
        content: row.get(3)?,
        image_url: row.get(4)?,
        recommendations: serde_json::from_str::<Vec<Material>>(&recommendations)
            .map_err(|e| conversion_err(5, e))?,
        created_at: parse_timestamp(6, &created_at)?,
    })
}

fn encode_recommendations(materials: &[Material]) -> Result<String, rusqlite::Error> {
    serde_json::to_string(materials).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Outcome of an append attempt, decided inside the writer thread.
enum Appended {
    Stored(Message),
    ChatMissing,
}

/// Append a message to the end of a chat.
///
/// Clamps `created_at` to the chat's newest message and titles the chat from
/// its first user message, all in one transaction.
pub async fn append_message(
    db: &Database,
    chat_id: &str,
    message: Message,
) -> Result<Message, GradientError> {
    let chat_id_owned = chat_id.to_string();
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Appended, rusqlite::Error> {
            let tx = conn.transaction()?;

            let exists = tx
                .query_row(
                    "SELECT 1 FROM chats WHERE id = ?1",
                    params![chat_id_owned],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Ok(Appended::ChatMissing);
            }

            let last: Option<String> = tx
                .query_row(
                    "SELECT created_at FROM messages WHERE chat_id = ?1
                     ORDER BY created_at DESC, seq DESC LIMIT 1",
                    params![chat_id_owned],
                    |row| row.get(0),
                )
                .optional()?;
            let last = last.map(|raw| parse_timestamp(0, &raw)).transpose()?;

            let mut message = message;
            message.chat_id = chat_id_owned.clone();
            message.created_at = next_created_at(last, message.created_at);

            if last.is_none()
                && message.role == Role::User
                && let Some(title) = derive_chat_title(&message.content)
            {
                tx.execute(
                    "UPDATE chats SET title = ?1 WHERE id = ?2",
                    params![title, chat_id_owned],
                )?;
            }

            tx.execute(
                "INSERT INTO messages (id, chat_id, role, content, image_url, recommendations, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    message.id,
                    message.chat_id,
                    message.role.to_string(),
                    message.content,
                    message.image_url,
                    encode_recommendations(&message.recommendations)?,
                    format_timestamp(&message.created_at),
                ],
            )?;
            tx.commit()?;
            Ok(Appended::Stored(message))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        Appended::Stored(message) => Ok(message),
        Appended::ChatMissing => Err(GradientError::NotFound {
            kind: "chat",
            id: chat_id.to_string(),
        }),
    }
}

/// Messages of a chat in append order.
pub async fn list_messages(db: &Database, chat_id: &str) -> Result<Vec<Message>, GradientError> {
    let chat_id = chat_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE chat_id = ?1 ORDER BY created_at ASC, seq ASC"
            ))?;
            let rows = stmt.query_map(params![chat_id], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Get one message by id.
pub async fn get_message(db: &Database, id: &str) -> Result<Option<Message>, GradientError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Message>, rusqlite::Error> {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                message_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Merge `patch` into a message of `chat_id`.
pub async fn update_message(
    db: &Database,
    chat_id: &str,
    message_id: &str,
    patch: &MessagePatch,
) -> Result<(), GradientError> {
    let (chat, id, patch) = (chat_id.to_string(), message_id.to_string(), patch.clone());
    let found = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row(
                    "SELECT 1 FROM messages WHERE id = ?1 AND chat_id = ?2",
                    params![id, chat],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Ok(false);
            }
            if let Some(content) = &patch.content {
                tx.execute(
                    "UPDATE messages SET content = ?1 WHERE id = ?2",
                    params![content, id],
                )?;
            }
            if let Some(recommendations) = &patch.recommendations {
                tx.execute(
                    "UPDATE messages SET recommendations = ?1 WHERE id = ?2",
                    params![encode_recommendations(recommendations)?, id],
                )?;
            }
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;

    if found {
        Ok(())
    } else {
        Err(GradientError::NotFound {
            kind: "message",
            id: message_id.to_string(),
        })
    }
}
