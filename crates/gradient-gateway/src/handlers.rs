// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gradient_agent::SendMessage;
use gradient_core::{Chat, HealthStatus, Material, Message};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::sse;

/// Request body for `POST /api/chat`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Image as a `data:` URI.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
}

impl From<ChatRequest> for SendMessage {
    fn from(body: ChatRequest) -> Self {
        SendMessage {
            chat_id: body.chat_id,
            message: body.message.unwrap_or_default(),
            image_url: body.image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default, rename = "chatId")]
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub materials: Vec<Material>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatListResponse {
    pub chats: Vec<Chat>,
}

/// Health of one adapter.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdapterHealth {
    pub name: String,
    pub kind: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub adapters: Vec<AdapterHealth>,
}

/// POST /api/chat
///
/// Runs the pre-stream phase synchronously so input and storage errors get
/// a proper status, then streams the turn as SSE.
pub async fn post_chat(
    State(state): State<GatewayState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected chat request body");
        ApiError::bad_request(rejection.body_text())
    })?;

    let turn = state
        .service
        .begin(body.into())
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to process chat request"))?;

    debug!(chat_id = turn.chat_id(), "streaming turn");
    Ok(sse::stream_turn(turn, state.stream_buffer).into_response())
}

/// GET /api/chat/history?chatId=...
pub async fn get_history(
    State(state): State<GatewayState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let chat_id = query.chat_id.unwrap_or_default();
    let messages = state
        .service
        .history(&chat_id)
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to fetch chat history"))?;
    Ok(Json(HistoryResponse { messages }))
}

/// GET /api/recommendations?query=...&limit=...
///
/// Scores the literal query; no conversation context is applied.
pub async fn get_recommendations(
    State(state): State<GatewayState>,
    Query(query): Query<RecommendationsQuery>,
) -> Json<RecommendationsResponse> {
    let materials = state.service.recommend(&query.query, query.limit);
    Json(RecommendationsResponse { materials })
}

/// GET /api/chats
pub async fn list_chats(
    State(state): State<GatewayState>,
) -> Result<Json<ChatListResponse>, ApiError> {
    let chats = state
        .service
        .chats()
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to list chats"))?;
    Ok(Json(ChatListResponse { chats }))
}

/// DELETE /api/chats/{id}
pub async fn delete_chat(
    State(state): State<GatewayState>,
    Path(chat_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .service
        .delete_chat(&chat_id)
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to delete chat"))?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("chat not found: {chat_id}")))
    }
}

/// GET /health
///
/// Unauthenticated; reports every adapter's health check.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let service = &state.service;
    let checks = [
        (
            service.store().name().to_string(),
            service.store().adapter_type(),
            service.store().health_check().await,
        ),
        (
            service.provider().name().to_string(),
            service.provider().adapter_type(),
            service.provider().health_check().await,
        ),
    ];

    let adapters: Vec<AdapterHealth> = checks
        .into_iter()
        .map(|(name, kind, result)| {
            let (status, detail) = match result {
                Ok(HealthStatus::Healthy) => ("healthy", None),
                Ok(HealthStatus::Degraded(why)) => ("degraded", Some(why)),
                Ok(HealthStatus::Unhealthy(why)) => ("unhealthy", Some(why)),
                Err(e) => ("unhealthy", Some(e.to_string())),
            };
            AdapterHealth {
                name,
                kind: kind.to_string().to_lowercase(),
                status: status.to_string(),
                detail,
            }
        })
        .collect();

    let status = if adapters.iter().all(|a| a.status == "healthy") {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: state.health.version.to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        adapters,
    })
}
