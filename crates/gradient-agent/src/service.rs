// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat service: the pre-stream phase of a send and the read-only queries.

use std::sync::Arc;
use std::time::Duration;

use gradient_config::model::ServerConfig;
use gradient_context::ContextEngine;
use gradient_core::{
    Chat, ConversationStore, GenerationProvider, GradientError, InlineImage, Material, Message,
    Role,
};
use gradient_recommend::Recommender;
use tracing::{debug, info};
use uuid::Uuid;

use crate::locks::ChatLocks;
use crate::turn::ChatTurn;

/// Send-message request as received from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessage {
    /// Existing or client-chosen chat id. `None` starts a new chat.
    pub chat_id: Option<String>,
    pub message: String,
    /// Image as a `data:` URI. An empty string counts as absent.
    pub image_url: Option<String>,
}

impl SendMessage {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn in_chat(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }
}

/// Limits applied to every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSettings {
    /// Deadline for the whole stream phase.
    pub generation_timeout: Duration,
    /// Largest accepted decoded image.
    pub max_image_bytes: usize,
}

impl TurnSettings {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            generation_timeout: Duration::from_secs(server.generation_timeout_secs),
            max_image_bytes: server.max_image_bytes,
        }
    }
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// Coordinates sends against one store, provider and catalog.
///
/// Sends to the same chat are serialized: a second [`begin`](Self::begin)
/// waits until the first turn has finished or been dropped.
pub struct ChatService {
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn GenerationProvider>,
    recommender: Arc<Recommender>,
    context: Arc<ContextEngine>,
    settings: TurnSettings,
    chat_locks: ChatLocks,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn GenerationProvider>,
        recommender: Arc<Recommender>,
        context: Arc<ContextEngine>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            store,
            provider,
            recommender,
            context,
            settings,
            chat_locks: ChatLocks::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn provider(&self) -> &Arc<dyn GenerationProvider> {
        &self.provider
    }

    pub fn recommender(&self) -> &Recommender {
        &self.recommender
    }

    pub fn settings(&self) -> TurnSettings {
        self.settings
    }

    /// Validates and persists the user turn, then prepares the assistant turn.
    ///
    /// Every error is returned before any event is produced. Input errors
    /// leave the store untouched.
    pub async fn begin(&self, request: SendMessage) -> Result<ChatTurn, GradientError> {
        let SendMessage {
            chat_id,
            message,
            image_url,
        } = request;

        let image_url = image_url.filter(|uri| !uri.trim().is_empty());
        if message.trim().is_empty() && image_url.is_none() {
            return Err(GradientError::InvalidInput(
                "Either message or image is required".into(),
            ));
        }
        let image = image_url
            .as_deref()
            .map(|uri| InlineImage::from_data_uri(uri, self.settings.max_image_bytes))
            .transpose()?;

        let chat_id = chat_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let guard = self.chat_locks.acquire(&chat_id).await;

        if self.store.get_chat(&chat_id).await?.is_none() {
            self.store.create_chat(&Chat::new(&chat_id)).await?;
            info!(chat_id = %chat_id, "created chat");
        }

        let history = self.store.list(&chat_id).await?;
        let user = Message::new(new_message_id(), &chat_id, Role::User, &message)
            .with_image(image_url);
        self.store.append(&chat_id, user).await?;

        let recommendation = self
            .recommender
            .recommend_in_context(&message, &history, None);
        debug!(
            chat_id = %chat_id,
            history = history.len(),
            resolved_query = %recommendation.resolved_query,
            materials = recommendation.materials.len(),
            "recommendations computed"
        );

        let request = self
            .context
            .assemble(&message, &history, &recommendation.materials, image);

        let assistant = Message::new(new_message_id(), &chat_id, Role::Assistant, "")
            .with_recommendations(recommendation.materials.clone());
        let assistant = self.store.append(&chat_id, assistant).await?;

        Ok(ChatTurn::new(
            chat_id,
            assistant.id,
            recommendation.materials,
            request,
            Arc::clone(&self.store),
            Arc::clone(&self.provider),
            self.settings.generation_timeout,
            guard,
        ))
    }

    /// Messages of a chat, oldest first. Unknown chats have no messages.
    pub async fn history(&self, chat_id: &str) -> Result<Vec<Message>, GradientError> {
        if chat_id.trim().is_empty() {
            return Err(GradientError::InvalidInput("Chat ID is required".into()));
        }
        self.store.list(chat_id).await
    }

    /// All chats, most recent first.
    pub async fn chats(&self) -> Result<Vec<Chat>, GradientError> {
        self.store.list_chats().await
    }

    /// Deletes a chat and its messages once no turn is running on it.
    pub async fn delete_chat(&self, chat_id: &str) -> Result<bool, GradientError> {
        let _guard = self.chat_locks.acquire(chat_id).await;
        let deleted = self.store.delete_chat(chat_id).await?;
        if deleted {
            info!(chat_id, "deleted chat");
        }
        Ok(deleted)
    }

    /// Scores the literal query, without context resolution.
    pub fn recommend(&self, query: &str, limit: Option<usize>) -> Vec<Material> {
        self.recommender.recommend(query, limit)
    }
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apology::{GENERIC_APOLOGY, IMAGE_REJECTED_APOLOGY};
    use crate::turn::TurnOutcome;
    use gradient_core::{DEFAULT_CHAT_TITLE, StreamEvent};
    use gradient_recommend::Catalog;
    use gradient_storage::InMemoryStore;
    use gradient_test_utils::{MockProvider, Reply};
    use tokio::sync::mpsc;
    use tracing_test::traced_test;

    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

    struct Fixture {
        service: Arc<ChatService>,
        store: Arc<InMemoryStore>,
        provider: MockProvider,
    }

    fn fixture_with(replies: Vec<Reply>, settings: TurnSettings) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let provider = MockProvider::with_replies(replies);
        let recommender = Recommender::new(Catalog::builtin().unwrap(), 10);
        let service = ChatService::new(
            store.clone(),
            Arc::new(provider.clone()),
            Arc::new(recommender),
            Arc::new(ContextEngine::default()),
            settings,
        );
        Fixture {
            service: Arc::new(service),
            store,
            provider,
        }
    }

    fn fixture(replies: Vec<Reply>) -> Fixture {
        fixture_with(replies, TurnSettings::default())
    }

    async fn run_to_end(turn: ChatTurn) -> (TurnOutcome, Vec<StreamEvent>) {
        let (tx, mut rx) = mpsc::channel(64);
        let outcome = turn.run(tx).await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (outcome, events)
    }

    fn ids(materials: &[Material]) -> Vec<&str> {
        materials.iter().map(|m| m.id.as_str()).collect()
    }

    #[tokio::test]
    async fn new_chat_turn_streams_and_persists() {
        let fx = fixture(vec![Reply::chunks(["Aljabar linear ", "membahas vektor."])]);
        let turn = fx
            .service
            .begin(SendMessage::text("Berikan saya materi terkait aljabar linear"))
            .await
            .unwrap();
        let chat_id = turn.chat_id().to_string();
        assert_eq!(ids(turn.recommendations()), ["1", "2"]);

        let (outcome, events) = run_to_end(turn).await;
        assert_eq!(outcome, TurnOutcome::Completed { chunks: 2 });

        let StreamEvent::Start {
            chat_id: started,
            recommendations,
        } = &events[0]
        else {
            panic!("first event must be start, got {:?}", events[0]);
        };
        assert_eq!(started, &chat_id);
        assert_eq!(events.last(), Some(&StreamEvent::Complete));

        let streamed: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Content { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();

        let messages = fx.store.list(&chat_id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, streamed);
        assert_eq!(&messages[1].recommendations, recommendations);

        let chat = fx.store.get_chat(&chat_id).await.unwrap().unwrap();
        assert_eq!(chat.title, "Berikan saya materi terkait aljabar linear");
    }

    #[tokio::test]
    #[traced_test]
    async fn mid_stream_failure_is_replaced_by_apology() {
        let fx = fixture(vec![Reply::FailAfter {
            chunks: vec!["Seb".into(), "agian".into()],
            reason: "connection reset".into(),
        }]);
        let turn = fx.service.begin(SendMessage::text("Apa itu GDP?")).await.unwrap();
        let chat_id = turn.chat_id().to_string();

        let (outcome, events) = run_to_end(turn).await;
        assert!(matches!(outcome, TurnOutcome::Recovered { .. }));

        let kinds: Vec<&str> = events.iter().map(StreamEvent::kind).collect();
        assert_eq!(kinds, ["start", "content", "content", "error", "complete"]);
        assert_eq!(
            events[3],
            StreamEvent::Error {
                content: GENERIC_APOLOGY.into()
            }
        );

        let messages = fx.store.list(&chat_id).await.unwrap();
        assert_eq!(messages[1].content, GENERIC_APOLOGY);
        assert!(logs_contain("generation failed"));
        assert!(logs_contain("connection reset"));
    }

    #[tokio::test]
    async fn rejected_image_gets_image_apology() {
        let fx = fixture(vec![Reply::FailToOpen(
            "Gemini API returned 413 Payload Too Large".into(),
        )]);
        let request = SendMessage {
            image_url: Some(PNG_URI.into()),
            ..SendMessage::default()
        };
        let turn = fx.service.begin(request).await.unwrap();
        let chat_id = turn.chat_id().to_string();
        assert!(turn.request().image.is_some());

        let (_, events) = run_to_end(turn).await;
        let kinds: Vec<&str> = events.iter().map(StreamEvent::kind).collect();
        assert_eq!(kinds, ["start", "error", "complete"]);

        let messages = fx.store.list(&chat_id).await.unwrap();
        assert_eq!(messages[0].image_url.as_deref(), Some(PNG_URI));
        assert_eq!(messages[1].content, IMAGE_REJECTED_APOLOGY);
        // Image-only first message keeps the default title.
        let chat = fx.store.get_chat(&chat_id).await.unwrap().unwrap();
        assert_eq!(chat.title, DEFAULT_CHAT_TITLE);
    }

    #[tokio::test]
    async fn empty_request_is_rejected_without_side_effects() {
        let fx = fixture(vec![]);
        let request = SendMessage {
            message: "   ".into(),
            image_url: Some(String::new()),
            chat_id: None,
        };
        let err = fx.service.begin(request).await.err().unwrap();
        assert!(matches!(err, GradientError::InvalidInput(_)));
        assert!(fx.store.list_chats().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_image_is_rejected_before_storage() {
        let fx = fixture(vec![]);
        let request = SendMessage {
            message: "lihat ini".into(),
            image_url: Some("data:text/plain;base64,aGVsbG8=".into()),
            chat_id: Some("c1".into()),
        };
        let err = fx.service.begin(request).await.err().unwrap();
        assert!(err.is_client_error());
        assert!(fx.store.get_chat("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn anaphoric_follow_up_uses_earlier_question() {
        let fx = fixture(vec![Reply::text("Integral adalah..."), Reply::text("Berikut materinya")]);

        let first = fx.service.begin(SendMessage::text("Jelaskan integral")).await.unwrap();
        let chat_id = first.chat_id().to_string();
        run_to_end(first).await;

        let second = fx
            .service
            .begin(SendMessage::text("berikan materi tentang itu").in_chat(&chat_id))
            .await
            .unwrap();
        let direct = fx.service.recommend("Jelaskan integral", None);
        assert_eq!(second.recommendations(), direct.as_slice());
        run_to_end(second).await;

        let requests = fx.provider.requests().await;
        assert_eq!(requests.len(), 2);
        assert!(requests[1].prompt.contains("User: Jelaskan integral"));
        assert!(requests[1].prompt.contains("Assistant: Integral adalah..."));
        assert_eq!(fx.store.list(&chat_id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn disconnect_keeps_streamed_content() {
        let fx = fixture(vec![Reply::Hang(vec!["Halo".into()])]);
        let turn = fx.service.begin(SendMessage::text("Halo")).await.unwrap();
        let chat_id = turn.chat_id().to_string();

        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(turn.run(tx));
        assert_eq!(rx.recv().await.map(|e| e.kind()), Some("start"));
        assert_eq!(
            rx.recv().await,
            Some(StreamEvent::Content {
                content: "Halo".into()
            })
        );
        drop(rx);

        let outcome = handle.await.unwrap();
        assert_eq!(outcome, TurnOutcome::Cancelled { chunks: 1 });
        let messages = fx.store.list(&chat_id).await.unwrap();
        assert_eq!(messages[1].content, "Halo");
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_generation_times_out() {
        let settings = TurnSettings {
            generation_timeout: Duration::from_secs(5),
            ..TurnSettings::default()
        };
        let fx = fixture_with(vec![Reply::Hang(vec!["Halo".into()])], settings);
        let turn = fx.service.begin(SendMessage::text("Halo")).await.unwrap();

        let (outcome, events) = run_to_end(turn).await;
        match outcome {
            TurnOutcome::Recovered { reason } => assert!(reason.contains("timed out"), "{reason}"),
            other => panic!("expected Recovered, got {other:?}"),
        }
        let kinds: Vec<&str> = events.iter().map(StreamEvent::kind).collect();
        assert_eq!(kinds, ["start", "content", "error", "complete"]);
    }

    #[tokio::test]
    async fn sends_to_one_chat_are_serialized() {
        let fx = fixture(vec![Reply::text("satu"), Reply::text("dua")]);
        let first = fx
            .service
            .begin(SendMessage::text("pertama").in_chat("c1"))
            .await
            .unwrap();

        let service = Arc::clone(&fx.service);
        let mut second = tokio::spawn(async move {
            service.begin(SendMessage::text("kedua").in_chat("c1")).await
        });
        assert!(
            tokio::time::timeout(Duration::from_millis(50), &mut second)
                .await
                .is_err(),
            "second send must wait for the first turn"
        );

        run_to_end(first).await;
        let second = second.await.unwrap().unwrap();
        run_to_end(second).await;

        let roles: Vec<Role> = fx
            .store
            .list("c1")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn delete_does_not_break_serialization_for_queued_sends() {
        let fx = fixture(vec![Reply::text("satu"), Reply::text("dua"), Reply::text("tiga")]);
        let first = fx
            .service
            .begin(SendMessage::text("pertama").in_chat("c1"))
            .await
            .unwrap();

        let service = Arc::clone(&fx.service);
        let delete = tokio::spawn(async move { service.delete_chat("c1").await });
        tokio::task::yield_now().await;
        let service = Arc::clone(&fx.service);
        let mut second = tokio::spawn(async move {
            service.begin(SendMessage::text("kedua").in_chat("c1")).await
        });
        assert!(
            tokio::time::timeout(Duration::from_millis(50), &mut second)
                .await
                .is_err()
        );

        run_to_end(first).await;
        assert!(delete.await.unwrap().unwrap());
        let second = second.await.unwrap().unwrap();

        let service = Arc::clone(&fx.service);
        let mut third = tokio::spawn(async move {
            service.begin(SendMessage::text("ketiga").in_chat("c1")).await
        });
        assert!(
            tokio::time::timeout(Duration::from_millis(50), &mut third)
                .await
                .is_err(),
            "a send after delete must still wait for the running turn"
        );

        run_to_end(second).await;
        run_to_end(third.await.unwrap().unwrap()).await;
        assert_eq!(fx.store.list("c1").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn finished_turns_release_their_lock_entries() {
        let fx = fixture(vec![Reply::text("satu"), Reply::text("dua")]);
        for chat_id in ["a", "b"] {
            let turn = fx
                .service
                .begin(SendMessage::text("halo").in_chat(chat_id))
                .await
                .unwrap();
            assert_eq!(fx.service.chat_locks.len(), 1);
            run_to_end(turn).await;
        }
        assert_eq!(fx.service.chat_locks.len(), 0);

        fx.service.delete_chat("a").await.unwrap();
        fx.service.delete_chat("never-existed").await.unwrap();
        assert_eq!(fx.service.chat_locks.len(), 0);
    }

    #[tokio::test]
    async fn history_requires_chat_id() {
        let fx = fixture(vec![]);
        assert!(fx.service.history("").await.err().unwrap().is_client_error());
        assert!(fx.service.history("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_chat_removes_messages() {
        let fx = fixture(vec![]);
        let turn = fx.service.begin(SendMessage::text("hapus aku")).await.unwrap();
        let chat_id = turn.chat_id().to_string();
        run_to_end(turn).await;

        assert!(fx.service.delete_chat(&chat_id).await.unwrap());
        assert!(fx.service.chats().await.unwrap().is_empty());
        assert!(!fx.service.delete_chat(&chat_id).await.unwrap());
    }
}
