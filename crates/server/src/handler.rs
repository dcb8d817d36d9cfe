//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheInspectParams, inspect_impl};
use crate::tools::snippet_render::{SnippetRenderParams, render_impl};
use ghsnip_client::{FetchClient, Resolver};
use ghsnip_core::CacheDb;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// Resolver wired to the SQLite cache and the HTTP fetcher.
pub type AppResolver = Resolver<CacheDb, FetchClient>;

/// The main MCP server handler for mcp-ghsnip.
#[derive(Clone)]
pub struct GhSnipServer {
    resolver: Arc<AppResolver>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl GhSnipServer {
    /// Create a new server handler.
    pub fn new(resolver: AppResolver) -> Self {
        Self { resolver: Arc::new(resolver), tool_router: Self::tool_router() }
    }

    /// Fetch a file from a hosted repository and return the requested lines.
    #[tool(
        description = "Fetch a source file by blob URL (optionally followed by a line range like `10-20`) and return \
                       the selected lines with display URL and highlighting language. Uses a cache whose lifetime \
                       adapts to the age of the referencing document."
    )]
    async fn snippet_render(&self, params: Parameters<SnippetRenderParams>) -> Result<CallToolResult, McpError> {
        render_impl(&self.resolver, params.0).await
    }

    /// Report what the cache holds for a locator.
    #[tool(description = "Show the cache key, write time and payload size stored for a blob URL.")]
    async fn cache_inspect(&self, params: Parameters<CacheInspectParams>) -> Result<CallToolResult, McpError> {
        inspect_impl(&self.resolver, params.0).await
    }
}

impl ServerHandler for GhSnipServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-ghsnip".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghsnip_client::FetchConfig;

    #[tokio::test]
    async fn test_tools_are_listed() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = FetchClient::new(FetchConfig::default()).unwrap();
        let server = GhSnipServer::new(Resolver::from_config(db, fetcher, &Default::default()));

        let names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        assert!(names.contains(&"snippet_render".to_string()));
        assert!(names.contains(&"cache_inspect".to_string()));
    }
}
