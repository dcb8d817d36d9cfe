//! cache_inspect tool implementation.
//!
//! Reports what the cache holds for a locator without fetching anything.

use chrono::SecondsFormat;
use ghsnip_client::{Fetcher, Resolver};
use ghsnip_core::{CacheDb, Clock, Error, SourceReference};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_inspect tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInspectParams {
    /// Blob URL; a trailing line range is accepted and ignored.
    pub locator: String,
}

/// Output from the cache_inspect tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInspectOutput {
    /// Raw-content URL the cache key is derived from.
    pub raw_url: String,
    /// Namespaced cache key.
    pub cache_key: String,
    /// Whether an entry exists.
    pub cached: bool,
    /// Last write time (RFC 3339), if cached.
    pub written_at: Option<String>,
    /// Payload size in bytes, if cached.
    pub size: Option<usize>,
}

/// Implementation of the cache_inspect tool.
pub async fn inspect_impl<F, C>(
    resolver: &Resolver<CacheDb, F, C>, params: CacheInspectParams,
) -> Result<CallToolResult, McpError>
where
    F: Fetcher,
    C: Clock,
{
    let reference = SourceReference::parse_with_host(&params.locator, &resolver.hosts().display);
    if !reference.is_renderable() {
        return Err(Error::InvalidReference(params.locator).into());
    }

    let raw_url = reference.raw_url(resolver.hosts());
    let cache_key = resolver.cache_key(&raw_url);
    let entry = resolver.store().get_entry(&cache_key).await?;

    let output = CacheInspectOutput {
        raw_url,
        cache_key,
        cached: entry.is_some(),
        written_at: entry
            .as_ref()
            .map(|e| e.written_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        size: entry.as_ref().map(|e| e.payload.len()),
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
