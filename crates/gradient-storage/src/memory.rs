// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process conversation store, used for tests and `backend = "memory"`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gradient_core::{
    AdapterType, Chat, ConversationStore, GradientError, HealthStatus, Message, MessagePatch,
    PluginAdapter, Role, derive_chat_title, next_created_at,
};

#[derive(Default)]
struct State {
    /// Creation order.
    chats: Vec<Chat>,
    messages: HashMap<String, Vec<Message>>,
}

/// Conversation store kept entirely in memory. Contents vanish with the process.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginAdapter for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, GradientError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GradientError> {
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn initialize(&self) -> Result<(), GradientError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), GradientError> {
        Ok(())
    }

    async fn create_chat(&self, chat: &Chat) -> Result<(), GradientError> {
        let mut state = self.state.write().await;
        if state.chats.iter().any(|c| c.id == chat.id) {
            return Err(GradientError::InvalidInput(format!(
                "chat {} already exists",
                chat.id
            )));
        }
        state.chats.push(chat.clone());
        state.messages.insert(chat.id.clone(), Vec::new());
        Ok(())
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, GradientError> {
        let state = self.state.read().await;
        Ok(state.chats.iter().find(|c| c.id == chat_id).cloned())
    }

    async fn list_chats(&self) -> Result<Vec<Chat>, GradientError> {
        let state = self.state.read().await;
        let mut chats = state.chats.clone();
        chats.reverse();
        // Stable, so equal timestamps stay newest-inserted first.
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(chats)
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<bool, GradientError> {
        let mut state = self.state.write().await;
        let before = state.chats.len();
        state.chats.retain(|c| c.id != chat_id);
        state.messages.remove(chat_id);
        Ok(state.chats.len() != before)
    }

    async fn append(&self, chat_id: &str, mut message: Message) -> Result<Message, GradientError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let chat = state
            .chats
            .iter_mut()
            .find(|c| c.id == chat_id)
            .ok_or_else(|| GradientError::NotFound {
                kind: "chat",
                id: chat_id.to_string(),
            })?;
        let log = state.messages.entry(chat_id.to_string()).or_default();

        message.chat_id = chat_id.to_string();
        message.created_at = next_created_at(log.last().map(|m| m.created_at), message.created_at);

        if log.is_empty()
            && message.role == Role::User
            && let Some(title) = derive_chat_title(&message.content)
        {
            chat.title = title;
        }

        log.push(message.clone());
        Ok(message)
    }

    async fn list(&self, chat_id: &str) -> Result<Vec<Message>, GradientError> {
        let state = self.state.read().await;
        Ok(state.messages.get(chat_id).cloned().unwrap_or_default())
    }

    async fn update(
        &self,
        chat_id: &str,
        message_id: &str,
        patch: &MessagePatch,
    ) -> Result<(), GradientError> {
        let mut state = self.state.write().await;
        let message = state
            .messages
            .get_mut(chat_id)
            .and_then(|log| log.iter_mut().find(|m| m.id == message_id))
            .ok_or_else(|| GradientError::NotFound {
                kind: "message",
                id: message_id.to_string(),
            })?;
        message.apply(patch);
        Ok(())
    }
}
