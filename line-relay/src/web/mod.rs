//! Web server module for the LINE webhook.
//!
//! This module provides:
//! - `POST /callback`: signature check, event dispatch, `OK`
//! - `GET /health`: liveness check

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{callback, health, AppState, HealthResponse};
pub use signature::{sign_body, verify_line_signature, SIGNATURE_HEADER};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/callback", post(callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
