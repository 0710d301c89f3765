//! Skirmish Server
//!
//! HTTP server for the in-memory matchmaking and leaderboard engine.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (listens on :8080)
//! skirmish-server
//!
//! # Start with a config file
//! skirmish-server --config /path/to/skirmish.toml
//!
//! # Start with environment overrides
//! SKIRMISH__SERVER__PORT=9090 skirmish-server
//! ```

mod config;

use std::time::Duration;

use clap::Parser;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skirmish_core::Engine;

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Skirmish - in-memory matchmaking and leaderboard server
#[derive(Parser, Debug)]
#[command(name = "skirmish-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "SKIRMISH_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "SKIRMISH_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SKIRMISH_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SKIRMISH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "SKIRMISH_LOG_FORMAT")]
    log_format: Option<String>,

    /// Skip loading the built-in demo player fixture
    #[arg(long, env = "SKIRMISH_NO_DEMO_PLAYERS")]
    no_demo_players: bool,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load configuration
    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // Override with CLI arguments
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(level) = args.log_level {
        server_config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        server_config.logging.format = format;
    }
    if args.no_demo_players {
        server_config.demo.seed_players = false;
    }

    // Initialize logging
    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Skirmish server"
    );

    // Validate engine tunables before anything runs on them
    let engine_config = server_config.matchmaking.engine_config();
    engine_config
        .validate()
        .map_err(|reason| anyhow::anyhow!("invalid matchmaking configuration: {reason}"))?;

    // Install the Prometheus recorder backing /metrics
    let metrics = init_metrics(&server_config.metrics)?;

    // Create the engine
    let engine = Engine::new(engine_config);
    if server_config.demo.seed_players {
        engine.seed_demo_players()?;
    }

    // Build the router
    let app = skirmish_api::router(engine.clone(), metrics);

    // Start server with graceful shutdown
    let addr = server_config.server.socket_addr()?;
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    // Stop deadline and retry tasks before exiting
    engine.shutdown();

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber.with(fmt::layer().pretty().with_target(true)).init();
        }
    }

    Ok(())
}

/// Install the Prometheus metrics recorder
fn init_metrics(config: &config::MetricsConfig) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus recorder installed, counters served at /metrics");
    Ok(Some(handle))
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal(timeout: Duration) {
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
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    // Allow time for in-flight requests to complete
    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );

    tokio::time::sleep(timeout).await;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["skirmish-server", "--port", "9090"]);
        assert_eq!(args.port, Some(9090));
        assert!(!args.no_demo_players);
    }

    #[test]
    fn test_cli_demo_switch() {
        let args = Args::parse_from(["skirmish-server", "--no-demo-players"]);
        assert!(args.no_demo_players);
    }
}
