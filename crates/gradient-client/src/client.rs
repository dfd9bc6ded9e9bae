// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gradient gateway.

use std::time::Duration;

use futures::StreamExt;
use gradient_core::{Chat, GradientError, Material, Message, MessagePatch, StreamEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::decoder::FrameDecoder;
use crate::state::{ReplyState, TRANSPORT_APOLOGY};

/// Body of a send-message request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct HistoryBody {
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct MaterialsBody {
    materials: Vec<Material>,
}

#[derive(Deserialize)]
struct ChatsBody {
    chats: Vec<Chat>,
}

/// Talks to a running gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    /// Creates a client for the gateway at `base_url`, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Result<Self, GradientError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| GradientError::Config(format!("invalid gateway URL '{base_url}': {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        // No overall timeout: replies stream for as long as the server allows.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GradientError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GradientError> {
        self.base_url
            .join(path)
            .map_err(|e| GradientError::Internal(format!("invalid endpoint '{path}': {e}")))
    }

    /// Sends a message and streams the reply.
    ///
    /// `on_event` sees every decoded event together with the cumulative
    /// patch for the assistant message. A transport failure after the
    /// stream opened is reported as a final `error` event carrying a
    /// generic apology; it is not an `Err`.
    pub async fn send<F>(
        &self,
        request: &OutgoingMessage,
        mut on_event: F,
    ) -> Result<ReplyState, GradientError>
    where
        F: FnMut(&StreamEvent, &MessagePatch),
    {
        let url = self.endpoint("api/chat")?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response, request.chat_id.as_deref()).await?;

        let mut decoder = FrameDecoder::new();
        let mut state = ReplyState::new();
        let mut body = response.bytes_stream();

        while let Some(next) = body.next().await {
            let bytes = match next {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "reply stream broke");
                    let event = StreamEvent::Error {
                        content: TRANSPORT_APOLOGY.to_string(),
                    };
                    let patch = state.apply(&event);
                    on_event(&event, &patch);
                    return Ok(state);
                }
            };
            for event in decoder.push(&bytes) {
                let patch = state.apply(&event);
                on_event(&event, &patch);
            }
        }
        if let Some(event) = decoder.finish() {
            let patch = state.apply(&event);
            on_event(&event, &patch);
        }

        if !state.is_complete() {
            warn!("reply stream ended without a complete event");
        }
        debug!(chat_id = ?state.chat_id(), failed = state.failed(), "reply finished");
        Ok(state)
    }

    /// Messages of `chat_id` in conversation order.
    pub async fn history(&self, chat_id: &str) -> Result<Vec<Message>, GradientError> {
        let mut url = self.endpoint("api/chat/history")?;
        url.query_pairs_mut().append_pair("chatId", chat_id);
        let body: HistoryBody = self.get_json(url, Some(chat_id)).await?;
        Ok(body.messages)
    }

    /// Materials ranked for `query`.
    pub async fn recommendations(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Material>, GradientError> {
        let mut url = self.endpoint("api/recommendations")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            if let Some(limit) = limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        let body: MaterialsBody = self.get_json(url, None).await?;
        Ok(body.materials)
    }

    /// Chats known to the server, most recent first.
    pub async fn chats(&self) -> Result<Vec<Chat>, GradientError> {
        let url = self.endpoint("api/chats")?;
        let body: ChatsBody = self.get_json(url, None).await?;
        Ok(body.chats)
    }

    pub async fn delete_chat(&self, chat_id: &str) -> Result<(), GradientError> {
        let mut url = self.endpoint("api/chats/")?;
        url.path_segments_mut()
            .map_err(|()| GradientError::Internal("gateway URL cannot be a base".into()))?
            .pop_if_empty()
            .push(chat_id);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response, Some(chat_id)).await?;
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        chat_id: Option<&str>,
    ) -> Result<T, GradientError> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let response = check_status(response, chat_id).await?;
        response
            .json()
            .await
            .map_err(|e| GradientError::Internal(format!("unexpected gateway response: {e}")))
    }
}

fn transport_error(e: reqwest::Error) -> GradientError {
    GradientError::Internal(format!("gateway request failed: {e}"))
}

/// Maps a non-2xx response onto the error it describes.
async fn check_status(
    response: reqwest::Response,
    chat_id: Option<&str>,
) -> Result<reqwest::Response, GradientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);

    Err(match status {
        reqwest::StatusCode::BAD_REQUEST => GradientError::InvalidInput(message),
        reqwest::StatusCode::NOT_FOUND => GradientError::NotFound {
            kind: "chat",
            id: chat_id.unwrap_or_default().to_string(),
        },
        _ => GradientError::Internal(format!("gateway returned {status}: {message}")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse_body(events: &[serde_json::Value]) -> String {
        events
            .iter()
            .map(|e| format!("data: {e}\n\n"))
            .collect()
    }

    #[tokio::test]
    async fn send_streams_and_folds_events() {
        let server = MockServer::start().await;
        let body = sse_body(&[
            serde_json::json!({"type": "start", "chatId": "chat-1", "recommendations": []}),
            serde_json::json!({"type": "content", "content": "Aljabar "}),
            serde_json::json!({"type": "content", "content": "adalah..."}),
            serde_json::json!({"type": "complete"}),
        ]);
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(serde_json::json!({"message": "Apa itu aljabar?"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let mut kinds = Vec::new();
        let mut last_patch = MessagePatch::default();
        let state = client
            .send(
                &OutgoingMessage {
                    message: "Apa itu aljabar?".into(),
                    ..Default::default()
                },
                |event, patch| {
                    kinds.push(event.kind());
                    last_patch = patch.clone();
                },
            )
            .await
            .unwrap();

        assert_eq!(kinds, vec!["start", "content", "content", "complete"]);
        assert_eq!(state.chat_id(), Some("chat-1"));
        assert_eq!(state.content(), "Aljabar adalah...");
        assert_eq!(last_patch.content.as_deref(), Some("Aljabar adalah..."));
        assert!(state.is_complete());
    }

    #[tokio::test]
    async fn send_error_event_replaces_content() {
        let server = MockServer::start().await;
        let body = sse_body(&[
            serde_json::json!({"type": "start", "chatId": "chat-1", "recommendations": []}),
            serde_json::json!({"type": "content", "content": "Setengah"}),
            serde_json::json!({"type": "error", "content": "Sorry, I encountered an error while processing your request."}),
            serde_json::json!({"type": "complete"}),
        ]);
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let state = client
            .send(
                &OutgoingMessage {
                    message: "halo".into(),
                    chat_id: Some("chat-1".into()),
                    ..Default::default()
                },
                |_, _| {},
            )
            .await
            .unwrap();

        assert!(state.failed());
        assert_eq!(
            state.content(),
            "Sorry, I encountered an error while processing your request."
        );
    }

    #[tokio::test]
    async fn send_rejected_request_is_invalid_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "Either message or image is required"})),
            )
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let err = client
            .send(&OutgoingMessage::default(), |_, _| {})
            .await
            .unwrap_err();
        assert!(
            matches!(err, GradientError::InvalidInput(ref m) if m == "Either message or image is required"),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn history_passes_chat_id_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chat/history"))
            .and(query_param("chatId", "chat 1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{
                    "id": "m1",
                    "chatId": "chat 1",
                    "role": "user",
                    "content": "Apa itu aljabar?",
                    "recommendations": [],
                    "createdAt": "2026-01-05T08:00:00Z"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let messages = client.history("chat 1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Apa itu aljabar?");
    }

    #[tokio::test]
    async fn recommendations_pass_query_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/recommendations"))
            .and(query_param("query", "aljabar"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"materials": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        assert!(client.recommendations("aljabar", Some(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_chat_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/chats/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "chat not found: nope"})))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri()).unwrap();
        let err = client.delete_chat("nope").await.unwrap_err();
        assert!(matches!(err, GradientError::NotFound { ref id, .. } if id == "nope"));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = GatewayClient::new("http://localhost:3000/gradient").unwrap();
        assert_eq!(
            client.endpoint("api/chats").unwrap().as_str(),
            "http://localhost:3000/gradient/api/chats"
        );
        assert!(GatewayClient::new("not a url").is_err());
    }
}
