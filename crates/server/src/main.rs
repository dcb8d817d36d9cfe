//! mcp-ghsnip server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use ghsnip_client::{FetchClient, FetchConfig, Resolver};
use ghsnip_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache at {}", config.db_path.display()))?;
    let fetcher = FetchClient::new(FetchConfig::from(&config))?;
    let resolver = Resolver::from_config(db, fetcher, &config);

    tracing::info!(
        db = %config.db_path.display(),
        raw_host = %config.raw_host,
        "Starting mcp-ghsnip server on stdio transport"
    );

    let handler = handler::GhSnipServer::new(resolver);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
