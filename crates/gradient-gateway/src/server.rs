// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{delete, get, post};
use gradient_agent::ChatService;
use gradient_config::model::ServerConfig;
use gradient_core::GradientError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Process-level facts reported by `GET /health`.
#[derive(Debug, Clone)]
pub struct HealthState {
    pub start_time: Instant,
    pub version: &'static str,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub service: Arc<ChatService>,
    /// Capacity of each send's event relay channel.
    pub stream_buffer: usize,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(service: Arc<ChatService>, config: &ServerConfig) -> Self {
        Self {
            service,
            stream_buffer: config.stream_buffer,
            health: HealthState::default(),
        }
    }
}

/// Builds the application router.
///
/// - POST /api/chat
/// - GET /api/chat/history
/// - GET /api/recommendations
/// - GET /api/chats, DELETE /api/chats/{id}
/// - GET /health
pub fn router(state: GatewayState, cors_permissive: bool) -> Router {
    let api = Router::new()
        .route("/api/chat", post(handlers::post_chat))
        .route("/api/chat/history", get(handlers::get_history))
        .route("/api/recommendations", get(handlers::get_recommendations))
        .route("/api/chats", get(handlers::list_chats))
        .route("/api/chats/{id}", delete(handlers::delete_chat))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        api.layer(CorsLayer::permissive())
    } else {
        api
    }
}

/// Binds `host:port` and serves until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), GradientError> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        GradientError::Internal(format!("failed to bind gateway to {addr}: {e}"))
    })?;
    serve(listener, router(state, config.cors_permissive), shutdown).await
}

/// Serves `app` on an already bound listener with graceful shutdown.
///
/// In-flight streams are allowed to finish after `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), GradientError> {
    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".into());
    info!(addr = %addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| GradientError::Internal(format!("gateway server error: {e}")))?;

    info!("gateway stopped");
    Ok(())
}
