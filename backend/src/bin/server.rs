//! Attention HTTP Server Binary
//!
//! Entry point for the attention REST API server. Loads configuration,
//! wires the landmark provider and the in-memory store, and starts serving.
//!
//! # Usage
//!
//! ```bash
//! # No landmark detector: every lit frame is classified as absent
//! cargo run --bin attention-server
//!
//! # Delegate detection to a vision sidecar
//! LANDMARK_PROVIDER=remote LANDMARK_ENDPOINT=http://127.0.0.1:8500/landmarks \
//!   cargo run --bin attention-server --features remote-landmarks
//! ```
//!
//! # Environment Variables
//!
//! - `ATTENTION_CONFIG`: Path to a TOML config file (default: `attention.toml` lookup)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 5000)
//! - `LANDMARK_PROVIDER`: `none` | `remote`
//! - `LANDMARK_ENDPOINT`: Sidecar URL for the remote provider
//! - `ATTENTION_IDLE_TTL_SECS`: Evict users idle for this long
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use attention_rust::config::ServerConfig;
use attention_rust::db::{AttentionRepository, RepositoryFactory};
use attention_rust::http::{create_router_with_body_limit, AppState};
use attention_rust::models::EpochMillis;
use attention_rust::vision::provider_from_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting attention server");

    let config = ServerConfig::load().context("Failed to load configuration")?;

    let landmarks = provider_from_settings(&config.landmarks)
        .context("Failed to create landmark provider")?;
    info!("Landmark provider: {}", landmarks.name());

    let repository = RepositoryFactory::from_settings(&config.store);
    if config.store.idle_ttl().is_some() {
        spawn_idle_sweep(Arc::clone(&repository), &config);
    }

    let state = AppState::new(repository, landmarks);
    let app = create_router_with_body_limit(state, config.body_limit_bytes());

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Periodically drop records of users that stopped sending frames.
fn spawn_idle_sweep(repository: Arc<dyn AttentionRepository>, config: &ServerConfig) {
    let period = config.store.sweep_interval();
    info!("Idle sweep every {}s", period.as_secs());

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = repository.evict_idle(EpochMillis::now());
            if evicted > 0 {
                info!(evicted, remaining = repository.users_tracked(), "Idle sweep finished");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
