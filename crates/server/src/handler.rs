//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use crate::tools::{BrandsParams, ItemParams, ItemsParams, RefreshParams};
use crate::tools::{brands_impl, categories_impl, health_impl, item_impl, items_impl, refresh_impl, specs_impl};
use reelgear_catalog::CatalogCache;
use reelgear_core::CatalogStore;

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

/// The main MCP server handler for reelgear.
#[derive(Clone)]
pub struct CatalogServer {
    cache: Arc<CatalogCache>,
    store: Arc<dyn CatalogStore>,
    admin_token: Option<Arc<str>>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl CatalogServer {
    /// Create a new server handler.
    pub fn new(cache: Arc<CatalogCache>, store: Arc<dyn CatalogStore>, admin_token: Option<String>) -> Self {
        Self { cache, store, admin_token: admin_token.map(Arc::from), tool_router: Self::tool_router() }
    }

    #[tool(description = "List all equipment categories.")]
    async fn catalog_categories(&self) -> Result<CallToolResult, McpError> {
        categories_impl(&self.cache, self.store.as_ref()).await
    }

    #[tool(description = "List brands, optionally only those with items in a category.")]
    async fn catalog_brands(&self, params: Parameters<BrandsParams>) -> Result<CallToolResult, McpError> {
        brands_impl(&self.cache, self.store.as_ref(), params.0).await
    }

    /// List catalog items with their specs.
    ///
    /// Items are ordered by name; both filters are optional and combine.
    #[tool(description = "List equipment items with specs, optionally filtered by category and/or brand.")]
    async fn catalog_items(&self, params: Parameters<ItemsParams>) -> Result<CallToolResult, McpError> {
        items_impl(&self.cache, self.store.as_ref(), params.0).await
    }

    #[tool(description = "Get one equipment item with its specs.")]
    async fn catalog_item(&self, params: Parameters<ItemParams>) -> Result<CallToolResult, McpError> {
        item_impl(&self.cache, self.store.as_ref(), params.0).await
    }

    #[tool(description = "Get the category-specific specs of one equipment item.")]
    async fn catalog_item_specs(&self, params: Parameters<ItemParams>) -> Result<CallToolResult, McpError> {
        specs_impl(&self.cache, self.store.as_ref(), params.0).await
    }

    #[tool(description = "Report catalog cache health: load state, last update, counts and staleness.")]
    async fn catalog_health(&self) -> Result<CallToolResult, McpError> {
        health_impl(&self.cache).await
    }

    /// Rebuild the cache from the database. Requires the admin token.
    #[tool(description = "Rebuild the catalog cache from the database now. Requires the admin token.")]
    async fn catalog_refresh(&self, params: Parameters<RefreshParams>) -> Result<CallToolResult, McpError> {
        refresh_impl(&self.cache, self.store.as_ref(), self.admin_token.as_deref(), params.0).await
    }
}

impl ServerHandler for CatalogServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "reelgear".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some("Film production equipment catalog: categories, brands, items and their specs.".into()),
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
