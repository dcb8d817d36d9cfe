//! Caller-facing snippet rendering.
//!
//! Glues the pieces together for a host that embeds a remote file: parse the
//! locator, resolve the payload, apply the line window and attach the
//! metadata the host needs for presentation.

use chrono::{DateTime, Utc};
use ghsnip_core::{Clock, ContentStore, SourceReference, slice};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::fetch::Fetcher;
use crate::language::language_for;
use crate::resolve::Resolver;

/// Text slice plus presentation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Snippet {
    /// Selected lines, decoded as UTF-8 (invalid sequences replaced).
    pub text: String,
    /// URL the payload was fetched from.
    pub raw_url: String,
    /// Human-facing blob page URL.
    pub display_url: String,
    /// Path of the file inside the repository.
    pub file: String,
    /// Lowercased file extension, empty if none.
    pub extension: String,
    /// Highlighting language derived from the extension.
    pub language: String,
    /// Where the payload came from: `fresh_cache`, `network` or `stale_cache`.
    pub origin: String,
}

/// Outcome of rendering a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// The locator does not point at a hosted blob; nothing was looked up.
    NotRenderable(SourceReference),
    /// Neither the network nor the cache had content.
    NoContent(SourceReference),
    Snippet { reference: SourceReference, snippet: Snippet },
}

impl Rendered {
    pub fn snippet(&self) -> Option<&Snippet> {
        match self {
            Rendered::Snippet { snippet, .. } => Some(snippet),
            _ => None,
        }
    }
}

/// Parse `locator`, resolve it and cut out the requested line window.
pub async fn render<S, F, C>(
    resolver: &Resolver<S, F, C>, locator: &str, referenced_at: Option<DateTime<Utc>>, purge: bool,
) -> Rendered
where
    S: ContentStore,
    F: Fetcher,
    C: Clock,
{
    let reference = SourceReference::parse_with_host(locator, &resolver.hosts().display);
    if !reference.is_renderable() {
        return Rendered::NotRenderable(reference);
    }

    let Some(resolved) = resolver.resolve(&reference, referenced_at, purge).await else {
        return Rendered::NoContent(reference);
    };

    let text = String::from_utf8_lossy(&resolved.payload);
    let text = slice(&text, reference.line_from, reference.line_to);
    let extension = reference.extension();

    let snippet = Snippet {
        text,
        raw_url: resolved.raw_url,
        display_url: reference.display_url(resolver.hosts()),
        file: reference.path.clone(),
        language: language_for(&extension).to_string(),
        extension,
        origin: resolved.origin.as_str().to_string(),
    };

    Rendered::Snippet { reference, snippet }
}
