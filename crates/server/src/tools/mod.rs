//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mcp-ghsnip server.

pub mod cache;
pub mod snippet_render;

use chrono::{DateTime, Utc};
use ghsnip_core::Error;

/// Parse an optional RFC 3339 timestamp supplied by a tool caller.
pub(crate) fn parse_timestamp(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, Error> {
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| Error::InvalidInput(format!("{field}: expected RFC 3339 timestamp, got {raw:?}: {e}")))
    })
    .transpose()
}
