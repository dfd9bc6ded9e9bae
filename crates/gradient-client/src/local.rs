// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side chat list and message cache, persisted as JSON documents.

use std::collections::BTreeMap;
use std::path::Path;

use gradient_core::{Chat, GradientError, Message, MessagePatch, Role, derive_chat_title};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const CHATS_FILE: &str = "chats.json";
pub const MESSAGES_FILE: &str = "messages.json";
pub const CURRENT_CHAT_FILE: &str = "current_chat.json";

/// Chats known to this client, most recent first, with their messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalChats {
    chats: Vec<Chat>,
    messages: BTreeMap<String, Vec<Message>>,
    current: Option<String>,
}

impl LocalChats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }

    pub fn current_chat_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn messages(&self, chat_id: &str) -> &[Message] {
        self.messages.get(chat_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn current_messages(&self) -> &[Message] {
        self.current
            .as_deref()
            .map(|id| self.messages(id))
            .unwrap_or_default()
    }

    /// Starts a new chat with a fresh id and makes it current.
    pub fn new_chat(&mut self) -> String {
        let chat = Chat::new(uuid::Uuid::new_v4().to_string());
        let id = chat.id.clone();
        self.chats.insert(0, chat);
        self.messages.insert(id.clone(), Vec::new());
        self.current = Some(id.clone());
        debug!(chat_id = %id, "created local chat");
        id
    }

    /// Current chat id, creating a chat when there is none.
    pub fn ensure_current(&mut self) -> String {
        match &self.current {
            Some(id) if self.chat(id).is_some() => id.clone(),
            _ => self.new_chat(),
        }
    }

    /// Makes `chat_id` current. Returns false for unknown chats.
    pub fn switch_to(&mut self, chat_id: &str) -> bool {
        if self.chat(chat_id).is_none() {
            return false;
        }
        self.current = Some(chat_id.to_string());
        true
    }

    /// Removes a chat and its messages.
    ///
    /// Deleting the current chat switches to the next remaining chat, or
    /// starts a new one when none is left.
    pub fn delete_chat(&mut self, chat_id: &str) -> bool {
        let before = self.chats.len();
        self.chats.retain(|c| c.id != chat_id);
        self.messages.remove(chat_id);
        let removed = self.chats.len() != before;

        if self.current.as_deref() == Some(chat_id) {
            match self.chats.first() {
                Some(next) => self.current = Some(next.id.clone()),
                None => {
                    self.new_chat();
                }
            }
        }
        removed
    }

    /// Appends a message; the first user message names the chat.
    pub fn add_message(&mut self, message: Message) {
        let log = self.messages.entry(message.chat_id.clone()).or_default();
        let first_user = message.role == Role::User && !log.iter().any(|m| m.role == Role::User);

        if first_user
            && let Some(title) = derive_chat_title(&message.content)
            && let Some(chat) = self.chats.iter_mut().find(|c| c.id == message.chat_id)
        {
            chat.title = title;
        }
        log.push(message);
    }

    /// Merges `patch` into a stored message. Returns false when absent.
    pub fn update_message(&mut self, chat_id: &str, message_id: &str, patch: &MessagePatch) -> bool {
        match self
            .messages
            .get_mut(chat_id)
            .and_then(|log| log.iter_mut().find(|m| m.id == message_id))
        {
            Some(message) => {
                message.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Loads state from `dir`. Missing or unreadable documents start empty.
    pub async fn load(dir: &Path) -> Self {
        let chats: Vec<Chat> = read_document(dir, CHATS_FILE).await.unwrap_or_default();
        let messages = read_document(dir, MESSAGES_FILE).await.unwrap_or_default();
        let current = read_document::<Option<String>>(dir, CURRENT_CHAT_FILE)
            .await
            .flatten();
        Self {
            chats,
            messages,
            current,
        }
    }

    /// Writes the three documents to `dir`, creating it if needed.
    pub async fn save(&self, dir: &Path) -> Result<(), GradientError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(GradientError::storage)?;
        write_document(dir, CHATS_FILE, &self.chats).await?;
        write_document(dir, MESSAGES_FILE, &self.messages).await?;
        write_document(dir, CURRENT_CHAT_FILE, &self.current).await
    }
}

async fn read_document<T: DeserializeOwned>(dir: &Path, name: &str) -> Option<T> {
    let path = dir.join(name);
    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read local chat state");
            return None;
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring corrupt local chat state");
            None
        }
    }
}

async fn write_document<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<(), GradientError> {
    let json = serde_json::to_vec_pretty(value).map_err(GradientError::storage)?;
    tokio::fs::write(dir.join(name), json)
        .await
        .map_err(GradientError::storage)
}
