//! # Kasir API Server
//!
//! Loads configuration, connects to PostgreSQL, and serves the checkout and
//! report routes until Ctrl+C or SIGTERM.

use std::net::SocketAddr;

use kasir_api::{router, ApiConfig, AppState};
use kasir_db::{CheckoutEngine, Database, SalesReportAggregator};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ApiConfig::load()?;

    // Initialize tracing; RUST_LOG overrides LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Kasir API server...");
    info!(
        port = config.server_port,
        max_connections = config.db_max_connections,
        lock_timeout_ms = ?config.db_lock_timeout_ms,
        allow_empty_checkout = config.allow_empty_checkout,
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(config.db_config()?).await?;
    info!("Connected to PostgreSQL");

    let store = db.checkout_store();
    let engine = CheckoutEngine::new(store.clone()).with_policy(config.checkout_policy());
    let reports = SalesReportAggregator::new(store);
    let app = router(AppState::new(engine, reports));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
