//! # returnboard-server
//!
//! Web dashboard for product exchange/refund data. Upload a workbook or point
//! at a shared spreadsheet; every valid sheet gets its own tab of charts.

mod config;
mod routes;

use anyhow::Context;
use clap::Parser;
use config::ServerConfig;
use routes::{create_router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    let state = AppState {
        remote: config.remote_options(),
        body_limit: config.body_limit(),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(
        addr = %config.addr,
        credentials = %config.credentials.display(),
        "returnboard-server listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
