//! snippet_render tool implementation.
//!
//! Resolves a blob locator through the cache and fetcher and returns the
//! requested lines plus presentation metadata.

use ghsnip_client::{Fetcher, Rendered, Resolver, Snippet, render};
use ghsnip_core::{Clock, ContentStore, Error, SourceReference};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::parse_timestamp;

/// Input parameters for snippet_render tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SnippetRenderParams {
    /// Blob URL, optionally followed by a space and a `from-to` line range
    /// (0-based, end exclusive).
    pub locator: String,

    /// Last modification time of the referencing document (RFC 3339).
    /// Without it the cache is only used as a fallback.
    #[serde(default)]
    pub referenced_at: Option<String>,

    /// Skip the freshness check and always try a live fetch.
    #[serde(default)]
    pub purge: bool,
}

/// Output structure for snippet_render tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SnippetRenderOutput {
    /// False when neither the network nor the cache had the file.
    pub found: bool,
    /// Parsed locator.
    pub reference: SourceReference,
    /// Selected text and metadata, present when found.
    pub snippet: Option<Snippet>,
}

/// Implementation of the snippet_render tool.
pub async fn render_impl<S, F, C>(
    resolver: &Resolver<S, F, C>, params: SnippetRenderParams,
) -> Result<CallToolResult, McpError>
where
    S: ContentStore,
    F: Fetcher,
    C: Clock,
{
    if params.locator.trim().is_empty() {
        return Err(Error::InvalidInput("locator cannot be empty".into()).into());
    }

    let referenced_at = parse_timestamp("referenced_at", params.referenced_at.as_deref())?;

    let output = match render(resolver, &params.locator, referenced_at, params.purge).await {
        Rendered::NotRenderable(_) => {
            return Err(Error::InvalidReference(format!(
                "expected https://{}/<owner>/<repo>/blob/<revision>/<path>, got {}",
                resolver.hosts().display,
                params.locator.trim()
            ))
            .into());
        }
        Rendered::NoContent(reference) => SnippetRenderOutput { found: false, reference, snippet: None },
        Rendered::Snippet { reference, snippet } => {
            SnippetRenderOutput { found: true, reference, snippet: Some(snippet) }
        }
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, resolver};
    use std::sync::atomic::Ordering;

    fn params(locator: &str) -> SnippetRenderParams {
        SnippetRenderParams { locator: locator.into(), referenced_at: None, purge: false }
    }

    #[tokio::test]
    async fn test_render_found() {
        let resolver = resolver(Some("a\nb\nc\nd")).await;
        let result = render_impl(&resolver, params("https://github.com/o/r/blob/main/run.sh 1-3"))
            .await
            .unwrap();

        let output: SnippetRenderOutput = output(&result);
        assert!(output.found);
        assert_eq!(output.reference.line_from, 1);
        let snippet = output.snippet.unwrap();
        assert_eq!(snippet.text, "b\nc");
        assert_eq!(snippet.language, "bash");
    }

    #[tokio::test]
    async fn test_render_not_found() {
        let resolver = resolver(None).await;
        let result = render_impl(&resolver, params("https://github.com/o/r/blob/main/run.sh"))
            .await
            .unwrap();

        let output: SnippetRenderOutput = output(&result);
        assert!(!output.found);
        assert!(output.snippet.is_none());
        assert_eq!(output.reference.path, "run.sh");
    }

    #[tokio::test]
    async fn test_render_invalid_reference_skips_fetch() {
        let resolver = resolver(Some("x")).await;
        let result = render_impl(&resolver, params("https://github.com/o/r/tree/main")).await;

        let err = result.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert_eq!(resolver_calls(&resolver), 0);
    }

    #[tokio::test]
    async fn test_render_empty_locator() {
        let resolver = resolver(Some("x")).await;
        assert!(render_impl(&resolver, params("  ")).await.is_err());
    }

    #[tokio::test]
    async fn test_render_bad_timestamp() {
        let resolver = resolver(Some("x")).await;
        let mut p = params("https://github.com/o/r/blob/main/run.sh");
        p.referenced_at = Some("yesterday".into());
        assert!(render_impl(&resolver, p).await.is_err());
    }

    #[tokio::test]
    async fn test_render_reuses_cache_for_old_document() {
        let resolver = resolver(Some("body")).await;
        let mut p = params("https://github.com/o/r/blob/main/run.sh");
        p.referenced_at = Some("2020-01-01T00:00:00Z".into());

        render_impl(&resolver, p.clone()).await.unwrap();
        let result = render_impl(&resolver, p).await.unwrap();

        let output: SnippetRenderOutput = output(&result);
        assert_eq!(output.snippet.unwrap().origin, "fresh_cache");
        assert_eq!(resolver_calls(&resolver), 1);
    }

    fn resolver_calls(resolver: &crate::tools::testing::TestResolver) -> usize {
        resolver.fetcher().calls.load(Ordering::SeqCst)
    }
}
