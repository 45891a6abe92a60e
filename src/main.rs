//! SPL custody analyzer - custody-risk review for SPL and Token-2022 mints
//!
//! This is the main entry point for the analyzer service.
//! It sets up the Axum web server over the analysis engine.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spl_custody_analyzer::config::AppConfig;
use spl_custody_analyzer::engine::Analyzer;
use spl_custody_analyzer::handlers::{self, ApiState};
use spl_custody_analyzer::metrics::MetricsState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    tracing::info!("Starting SPL custody analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        rpc = %config.rpc.url,
        max_in_flight = config.rpc.max_in_flight,
        batch_concurrency = config.batch.max_concurrency,
        "Configuration loaded"
    );

    let metrics = Arc::new(MetricsState::new());
    let analyzer = Arc::new(Analyzer::from_config(&config, metrics.clone())?);
    let state = Arc::new(ApiState::new(analyzer, metrics));
    let shutdown = state.shutdown.clone();

    let app = handlers::router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C, cancelling every in-flight analysis
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested, cancelling in-flight analyses");
    shutdown.cancel();
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spl_custody_analyzer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Load and validate configuration
fn load_config() -> anyhow::Result<AppConfig> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = match std::env::var("CUSTODY_CONFIG") {
        Ok(path) => AppConfig::load_from(std::path::Path::new(&path)),
        Err(_) => AppConfig::load(),
    }
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    Ok(config)
}
