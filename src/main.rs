//! API broker (v1)
//!
//! A health-aware API broker built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                  API BROKER                    │
//!                        │                                                │
//!   Client Request       │  ┌─────────┐   ┌──────────┐   ┌────────────┐  │
//!   ─────────────────────┼─▶│  http   │──▶│ routing  │──▶│  dispatch  │  │
//!                        │  │ server  │   │ resolver │   │   ranker   │  │
//!                        │  └─────────┘   └──────────┘   └─────┬──────┘  │
//!                        │                                     │         │
//!                        │                                     ▼         │
//!   Client Response      │  ┌─────────┐   ┌──────────┐   ┌────────────┐  │
//!   ◀────────────────────┼──│ mapping │◀──│ validate │◀──│ forwarder  │◀─┼── Providers
//!                        │  └─────────┘   └──────────┘   └────────────┘  │
//!                        │                                                │
//!                        │  ┌──────────────────────────────────────────┐ │
//!                        │  │          Cross-Cutting Concerns           │ │
//!                        │  │  ┌────────┐ ┌─────────┐ ┌─────────────┐  │ │
//!                        │  │  │ config │ │ health  │ │observability│  │ │
//!                        │  │  │        │ │monitors │ │metrics+event│  │ │
//!                        │  │  └────────┘ └─────────┘ └─────────────┘  │ │
//!                        │  └──────────────────────────────────────────┘ │
//!                        └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_broker::config::loader::load_config;
use api_broker::{BrokerConfig, HttpServer, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "api-broker", about = "Health-aware API broker")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_broker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("api-broker v0.1.0 starting");

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => BrokerConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        providers = config.providers.len(),
        resources = config.resources.len(),
        attempt_timeout_secs = config.timeouts.attempt_secs,
        "Configuration loaded"
    );

    // Initialize metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            api_broker::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    // Trigger shutdown on Ctrl+C
    let shutdown = Shutdown::new();
    let shutdown_trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown_trigger.trigger();
        }
    });

    // Create and run HTTP server (spawns one health monitor per provider)
    let server = HttpServer::new(config);
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
