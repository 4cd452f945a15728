//! Webhook endpoint handlers.
//!
//! `/callback` verifies the signature, dispatches every event in order and only
//! then answers LINE. Once the signature checks out the answer is always 200,
//! whatever happened downstream.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::completion::CompletionClient;
use crate::dispatch::dispatch_events;
use crate::line::{LineClient, WebhookBody};
use crate::util::text::preview;
use crate::web::signature::{verify_line_signature, SIGNATURE_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub line: LineClient,
    pub completion: CompletionClient,
}

impl AppState {
    /// Build the state, sharing one HTTP connection pool between both clients.
    pub fn new(config: Config, http: Client) -> Self {
        let line = LineClient::from_config(http.clone(), &config);
        let completion = CompletionClient::from_config(http, &config);

        Self {
            config: Arc::new(config),
            line,
            completion,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// LINE Webhook
// =============================================================================

/// LINE webhook endpoint.
///
/// This endpoint:
/// 1. Verifies `X-Line-Signature` against the raw body
/// 2. Parses the events
/// 3. Dispatches them sequentially
/// 4. Returns 200 "OK"
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    info!(
        body_length = body.len(),
        has_signature = !signature.is_empty(),
        "callback_received"
    );
    debug!(
        body_preview = %preview(&String::from_utf8_lossy(&body), 1000),
        "callback_body"
    );

    if !verify_line_signature(&state.config.channel_secret, &body, signature) {
        warn!("line_signature_invalid");
        return (StatusCode::BAD_REQUEST, "Invalid signature");
    }

    let webhook: WebhookBody = match serde_json::from_slice(&body) {
        Ok(w) => w,
        Err(e) => {
            warn!(error = %e, "webhook_parse_failed");
            return (StatusCode::BAD_REQUEST, "Malformed webhook body");
        }
    };

    let received = webhook.events.len();
    let destination = webhook.destination.clone();
    let events = webhook.into_inbound_events();

    info!(
        destination = ?destination,
        events_received = received,
        events_dispatched = events.len(),
        "callback_verified"
    );

    dispatch_events(&state, events).await;

    (StatusCode::OK, "OK")
}
