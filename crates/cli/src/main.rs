//! ghsnip command-line entry point.
//!
//! Exit codes: 0 when text was printed, 1 when no content is available,
//! 2 when the URL is not a blob URL or on any other error.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Parser;
use ghsnip_client::{FetchClient, FetchConfig, Rendered, Resolver, render};
use ghsnip_core::{AppConfig, CacheDb, SourceReference};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("loading configuration")?;
    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache at {}", config.db_path.display()))?;

    match cli.command {
        Commands::Show { url, lines, reference_time, purge, json } => {
            let locator = cli::locator(&url, lines.as_deref())?;
            let referenced_at = reference_time.resolve()?;
            let fetcher = FetchClient::new(FetchConfig::from(&config))?;
            let resolver = Resolver::from_config(db, fetcher, &config);
            show(&resolver, &locator, referenced_at, purge, json).await
        }
        Commands::Inspect { url } => inspect(&db, &config, &url).await,
    }
}

async fn show(
    resolver: &Resolver<CacheDb, FetchClient>, locator: &str, referenced_at: Option<DateTime<Utc>>, purge: bool,
    json: bool,
) -> Result<i32> {
    match render(resolver, locator, referenced_at, purge).await {
        Rendered::NotRenderable(_) => {
            eprintln!("not a blob URL: {locator}");
            Ok(2)
        }
        Rendered::NoContent(reference) => {
            tracing::info!(path = %reference.path, "no content available");
            Ok(1)
        }
        Rendered::Snippet { snippet, .. } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&snippet)?);
            } else {
                println!("{}", snippet.text);
            }
            Ok(0)
        }
    }
}

async fn inspect(db: &CacheDb, config: &AppConfig, url: &str) -> Result<i32> {
    let reference = SourceReference::parse_with_host(url, &config.display_host);
    if !reference.is_renderable() {
        eprintln!("not a blob URL: {url}");
        return Ok(2);
    }

    let raw_url = reference.raw_url(&config.hosts());
    let key = ghsnip_core::cache::compute_cache_key(&raw_url, &config.cache_namespace);

    println!("url:     {raw_url}");
    println!("key:     {key}");
    match db.get_entry(&key).await? {
        Some(entry) => {
            println!("written: {}", entry.written_at.to_rfc3339_opts(SecondsFormat::Secs, true));
            println!("size:    {} bytes", entry.payload.len());
            Ok(0)
        }
        None => {
            println!("cached:  no");
            Ok(1)
        }
    }
}
