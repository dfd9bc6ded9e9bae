// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation store trait for chat and message persistence.

use async_trait::async_trait;

use crate::error::GradientError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Chat, Message, MessagePatch};

/// Append-only per-chat message log.
///
/// Implementations must return messages in append order, which is also
/// non-decreasing `created_at` order, and must derive the chat title from
/// the first user message appended to an empty chat.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Prepares the backend (migrations, connections).
    async fn initialize(&self) -> Result<(), GradientError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), GradientError>;

    async fn create_chat(&self, chat: &Chat) -> Result<(), GradientError>;

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, GradientError>;

    /// All chats, most recently created first.
    async fn list_chats(&self) -> Result<Vec<Chat>, GradientError>;

    /// Deletes a chat and all of its messages. Returns whether it existed.
    async fn delete_chat(&self, chat_id: &str) -> Result<bool, GradientError>;

    /// Appends `message` to the end of the chat and returns it as stored.
    ///
    /// The stored `created_at` is clamped so it never precedes the chat's
    /// latest message.
    async fn append(&self, chat_id: &str, message: Message) -> Result<Message, GradientError>;

    /// Messages of a chat, oldest first. Unknown chats yield an empty list.
    async fn list(&self, chat_id: &str) -> Result<Vec<Message>, GradientError>;

    /// Merges `patch` into an existing message.
    async fn update(
        &self,
        chat_id: &str,
        message_id: &str,
        patch: &MessagePatch,
    ) -> Result<(), GradientError>;
}
