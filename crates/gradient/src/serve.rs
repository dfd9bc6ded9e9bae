// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gradient serve` command implementation.
//!
//! Opens the conversation store, loads the catalog and prompt, connects
//! the Gemini provider and runs the HTTP gateway until a shutdown signal.

use std::path::Path;
use std::sync::Arc;

use gradient_agent::{ChatService, TurnSettings, install_signal_handler};
use gradient_config::GradientConfig;
use gradient_context::ContextEngine;
use gradient_core::{ConversationStore, GenerationProvider, GradientError, PluginAdapter};
use gradient_gateway::{GatewayState, start_server};
use gradient_gemini::GeminiProvider;
use gradient_recommend::{Catalog, Recommender};
use tracing::{error, info, warn};

/// Runs the `gradient serve` command.
pub async fn run_serve(config: GradientConfig) -> Result<(), GradientError> {
    info!(name = %config.assistant.name, "starting gradient serve");

    let provider = GeminiProvider::new(&config.gemini).inspect_err(|e| {
        error!(error = %e, "failed to initialize Gemini provider");
        eprintln!(
            "error: Gemini API key required. Set gemini.api_key in the config, GRADIENT_GEMINI_API_KEY or GEMINI_API_KEY."
        );
    })?;
    let provider: Arc<dyn GenerationProvider> = Arc::new(provider);

    let (state, store) = build_gateway(&config, Arc::clone(&provider)).await?;

    let shutdown = install_signal_handler();
    let served = start_server(&config.server, state, shutdown).await;

    // Release adapters even when the server failed.
    if let Err(e) = provider.shutdown().await {
        warn!(error = %e, "provider shutdown failed");
    }
    if let Err(e) = store.close().await {
        warn!(error = %e, "store close failed");
    }

    served?;
    info!("gradient stopped");
    Ok(())
}

/// Wires store, catalog, prompt engine and `provider` into gateway state.
pub async fn build_gateway(
    config: &GradientConfig,
    provider: Arc<dyn GenerationProvider>,
) -> Result<(GatewayState, Arc<dyn ConversationStore>), GradientError> {
    let store = gradient_storage::open_store(&config.storage).await?;
    info!(backend = store.name(), "conversation store ready");

    let catalog = Catalog::load(config.recommend.catalog_file.as_deref().map(Path::new))?;
    info!(materials = catalog.len(), "catalog loaded");
    let recommender = Arc::new(Recommender::new(catalog, config.recommend.default_limit));

    let context = Arc::new(ContextEngine::new(&config.assistant).await?);

    let service = ChatService::new(
        Arc::clone(&store),
        provider,
        recommender,
        context,
        TurnSettings::from_config(&config.server),
    );
    let state = GatewayState::new(Arc::new(service), &config.server);
    Ok((state, store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use gradient_config::StorageBackend;
    use gradient_test_utils::{MockProvider, Reply};
    use http::Request;
    use tower::ServiceExt;

    fn memory_config() -> GradientConfig {
        let mut config = GradientConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config
    }

    #[tokio::test]
    async fn build_gateway_serves_recommendations_from_builtin_catalog() {
        let provider = Arc::new(MockProvider::new());
        let (state, store) = build_gateway(&memory_config(), provider).await.unwrap();
        assert_eq!(store.name(), "memory");

        let app = gradient_gateway::router(state, true);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/recommendations?query=aljabar")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["materials"][0]["id"], "1");
    }

    #[tokio::test]
    async fn build_gateway_uses_sqlite_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GradientConfig::default();
        config.storage.database_path = dir.path().join("g.db").to_string_lossy().into_owned();

        let provider = Arc::new(MockProvider::with_replies(vec![Reply::text("Halo!")]));
        let (state, store) = build_gateway(&config, provider).await.unwrap();
        assert_eq!(store.name(), "sqlite");
        assert!(dir.path().join("g.db").exists());
        drop(state);
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_catalog_file_fails_startup() {
        let mut config = memory_config();
        config.recommend.catalog_file = Some("/nonexistent/catalog.json".into());
        let provider = Arc::new(MockProvider::new());
        assert!(build_gateway(&config, provider).await.is_err());
    }
}
