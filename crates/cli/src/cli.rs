//! Command-line parsing for ghsnip.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ghsnip",
    version,
    about = "Print lines of a file hosted on GitHub, with an adaptive local cache",
    long_about = "ghsnip fetches a file by its blob URL and prints the requested line window. \
                  Cached copies are reused while they are younger than twice the age of the \
                  referencing document, and served as a fallback when the network fails."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the selected lines of a remote file.
    Show {
        /// Blob URL, e.g. https://github.com/owner/repo/blob/main/src/lib.rs
        url: String,

        /// Line window `from-to` (0-based, end exclusive).
        #[arg(allow_hyphen_values = true)]
        lines: Option<String>,

        #[command(flatten)]
        reference_time: ReferenceTime,

        /// Skip the freshness check and always try a live fetch.
        #[arg(long)]
        purge: bool,

        /// Print the full result as JSON instead of the bare text.
        #[arg(long)]
        json: bool,
    },

    /// Show what the cache holds for a blob URL.
    Inspect {
        /// Blob URL.
        url: String,
    },
}

/// Where the age of the referencing document comes from.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct ReferenceTime {
    /// Modification time of the referencing document (RFC 3339).
    #[arg(long, value_name = "RFC3339")]
    pub page_time: Option<String>,

    /// Use the modification time of this file as the document time.
    #[arg(long, value_name = "PATH")]
    pub page_file: Option<PathBuf>,
}

impl ReferenceTime {
    /// Resolve to a timestamp. A page file that cannot be read yields None.
    pub fn resolve(&self) -> Result<Option<DateTime<Utc>>> {
        if let Some(raw) = &self.page_time {
            let parsed = DateTime::parse_from_rfc3339(raw.trim())
                .with_context(|| format!("--page-time: expected RFC 3339 timestamp, got {raw:?}"))?;
            return Ok(Some(parsed.with_timezone(&Utc)));
        }

        Ok(self.page_file.as_deref().and_then(file_mtime))
    }
}

fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => Some(DateTime::<Utc>::from(modified)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "page file has no usable mtime");
            None
        }
    }
}

/// Join the URL and optional line window into a locator.
pub fn locator(url: &str, lines: Option<&str>) -> Result<String> {
    if url.trim().is_empty() {
        bail!("url cannot be empty");
    }
    Ok(match lines {
        Some(lines) => format!("{} {}", url.trim(), lines.trim()),
        None => url.trim().to_string(),
    })
}
