//! rosterlink-gw - roster integration gateway
//!
//! Serves the HTTP API in front of the triple store, the REST destination
//! store, the GraphQL store and the analysis endpoint.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use rosterlink_common::config::GatewayConfig;
use rosterlink_gw::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "rosterlink-gw", version, about = "Roster integration gateway")]
struct Args {
    /// Path to a TOML config file (overrides ./rosterlink.toml)
    #[arg(long, env = "ROSTERLINK_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Roster Link Gateway (rosterlink-gw) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = GatewayConfig::load(args.config.as_deref())?;

    info!("Triple store: {}", config.sparql_endpoint);
    info!("REST store:   {}", config.rest_endpoint);
    info!("GraphQL store: {}", config.graphql_endpoint);

    let listen_addr = config.listen_addr.clone();
    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!("rosterlink-gw listening on http://{}", listen_addr);
    info!("Health check: http://{}/health", listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
