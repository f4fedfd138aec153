//! Gateway HTTP server: same-origin relay between the chat client and the provider.

use crate::config::{self, Config};
use crate::gateway::protocol::{ChatError, ChatReply, ChatRequest};
use crate::llm::GeminiClient;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state for the gateway (config, provider client, resolved model).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub provider: GeminiClient,
    pub model: String,
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Startup fails when no provider API key is configured. Blocks until
/// shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let bind = config.gateway.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) {
        log::warn!(
            "gateway binding to non-loopback address {}; anyone who can reach it relays through your provider key",
            bind
        );
    }

    let api_key = config::resolve_api_key(&config)
        .context("no provider API key configured (set GEMINI_API_KEY or provider.apiKey)")?;
    let model = config::resolve_model(&config);
    let provider = GeminiClient::new(api_key, config.provider.base_url.clone());
    let bind_addr = format!("{}:{}", bind, config.gateway.port);

    let state = GatewayState {
        config: Arc::new(config),
        provider,
        model,
    };

    let app = Router::new()
        .route("/", get(health_http))
        .route("/api/chat", post(chat_http))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "model": state.model,
        "port": state.config.gateway.port,
    }))
}

/// POST /api/chat — relay one message to the provider.
/// 200 with `{reply}` on provider success (reply null when no usable text);
/// 500 with `{error}` on any provider failure.
async fn chat_http(
    State(state): State<GatewayState>,
    Json(req): Json<ChatRequest>,
) -> Response {
    match state.provider.generate(&state.model, &req.message).await {
        Ok(reply) => (StatusCode::OK, Json(ChatReply { reply })).into_response(),
        Err(e) => {
            log::warn!("provider request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatError {
                    error: "Something went wrong.".to_string(),
                }),
            )
                .into_response()
        }
    }
}
