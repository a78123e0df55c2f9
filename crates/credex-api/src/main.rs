//! # credex-api — Binary Entry Point
//!
//! Starts the Axum HTTP server and the eviction sweeper.
//! Binds to configurable port (default 8080).

use std::sync::Arc;

use credex_api::config::{AppConfig, LogFormat};
use credex_api::state::AppState;
use credex_vc::LocalToolkit;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Initialize structured tracing.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
    tracing::debug!(?config, "configuration loaded");

    let state = AppState::from_config(&config, Arc::new(LocalToolkit::new())).map_err(|e| {
        tracing::error!("State initialization failed: {e}");
        e
    })?;

    let _sweeper = credex_protocol::spawn_sweeper(
        state.offer_store.clone(),
        state.request_store.clone(),
        config.sweep_interval,
    );

    let app = credex_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("credex API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
