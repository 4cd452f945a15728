//! LineRelay - LINE webhook receiver that answers with a completion API.
//!
//! This binary:
//! - Receives LINE webhooks on `/callback`
//! - Verifies the channel signature
//! - Relays text messages to the completion endpoint and replies with the result

use std::net::SocketAddr;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use line_relay::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("line_relay_starting");

    // Load configuration; missing channel credentials abort startup
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        completion_url = %config.completion_url,
        completion_model = ?config.completion_model,
        completion_api_key_set = config.completion_api_key.is_some(),
        completion_timeout_seconds = config.completion_timeout.as_secs(),
        reply_max_chars = config.reply_max_chars,
        line_api_base_url = %config.line_api_base_url,
        "config_loaded"
    );

    // One HTTP client shared by the LINE and completion clients
    let http = Client::builder()
        .pool_max_idle_per_host(32)
        .build()
        .context("Failed to create HTTP client")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, http));

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("line_relay_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
