mod config;
mod history;
mod logview;
mod platform;
mod relay;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::history::HistoryBuffer;
use crate::relay::{HttpRelay, RelayDispatcher};
use crate::server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tgrelay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    if config_path.exists() {
        info!("Loading configuration from: {}", config_path.display());
    } else {
        info!(
            "No config file at {}, using defaults and environment",
            config_path.display()
        );
    }
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");

    // Create shared state
    let relay = HttpRelay::new(config.relay_timeout())?;
    let dispatcher = RelayDispatcher::new(Arc::new(relay), config.relay.destinations.clone());
    let history = HistoryBuffer::new(config.history.capacity);

    info!("  History capacity: {}", history.capacity());
    info!("  Relay timeout: {}s", config.relay.timeout_secs);
    for dest in dispatcher.destinations() {
        info!("  Relay destination: {} ({})", dest.name, dest.redacted_url());
    }
    if dispatcher.destinations().is_empty() {
        warn!("No relay destinations configured, updates will only be recorded");
    }

    let state = Arc::new(AppState::new(history, dispatcher));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Listening on http://{addr}");

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix. Pending relay tasks are dropped.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
