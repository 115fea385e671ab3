//! HTTP server for the messaging gateway.
//!
//! `POST {webhook_path}` takes Twilio's form-encoded inbound message and
//! answers with a TwiML envelope; `GET /health` reports uptime.

use crate::gateway::Gateway;
use axum::{
    extract::{rejection::FormRejection, State},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, post},
    Form, Router,
};
use concierge_channels::twilio::{self, InboundMessage};
use concierge_core::{config::ApiConfig, message::IncomingMessage};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    gateway: Arc<Gateway>,
    uptime: Instant,
}

impl ApiState {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            uptime: Instant::now(),
        }
    }
}

/// `GET /health` — liveness with uptime.
async fn health(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime.elapsed().as_secs(),
    }))
}

/// `POST /webhook` — one inbound chat message, one TwiML reply.
///
/// Always answers 200; a body that is not a valid form is treated as an
/// empty message.
async fn webhook(
    State(state): State<ApiState>,
    form: Result<Form<InboundMessage>, FormRejection>,
) -> impl IntoResponse {
    let inbound = match form {
        Ok(Form(inbound)) => inbound,
        Err(e) => {
            warn!("webhook: unreadable form body, treating as empty: {e}");
            InboundMessage::default()
        }
    };

    let incoming = IncomingMessage::new(inbound.from, inbound.body);
    let reply = state.gateway.handle_message(&incoming).await;

    (
        [(header::CONTENT_TYPE, twilio::CONTENT_TYPE)],
        twilio::message_response(&reply.text),
    )
}

/// Build the axum router with shared state.
pub fn build_router(state: ApiState, webhook_path: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(webhook_path, post(webhook))
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Run the webhook server until Ctrl-C.
pub async fn serve(config: &ApiConfig, gateway: Arc<Gateway>) -> anyhow::Result<()> {
    let app = build_router(ApiState::new(gateway), &config.webhook_path);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    info!("webhook listening on http://{addr}{}", config.webhook_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
