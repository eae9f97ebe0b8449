//! Backstop - Resilience toolkit for web scrapers
//!
//! Admin/observability server over the source registry: per-source circuit,
//! limiter, cache, and retry stats, plus operator controls.

mod api;
mod breaker;
mod cache;
mod clock;
mod config;
mod error;
mod limiter;
mod models;
mod pipeline;
mod registry;
mod retry;
mod tasks;

use std::net::SocketAddr;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use tasks::spawn_cleanup_task;

/// Main entry point for the Backstop admin server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the source registry, one pipeline per configured source
/// 4. Start the background cache sweep task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backstop=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Backstop admin server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: sources={:?}, cache_max_entries={}, cache_ttl_ms={}, port={}, cleanup_interval={}s",
        config.sources,
        config.cache_max_entries,
        config.cache_ttl_ms,
        config.server_port,
        config.cleanup_interval
    );

    // Build the registry; invalid component config is fatal at startup
    let state = AppState::from_config(&config)?;
    info!("Source registry initialized with {} sources", state.registry.len());

    // Start background cache sweep task
    let cleanup_handle = spawn_cleanup_task(state.registry.clone(), config.cleanup_interval);
    info!("Background cache sweep task started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the sweep task
    cleanup_handle.abort();
    warn!("Cache sweep task aborted");
}
