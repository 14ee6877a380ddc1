//! MCP tool implementations.
//!
//! Read tools serve from the catalog cache while it is loaded and holds data,
//! and query the store directly otherwise. Every response says which one
//! answered.

pub mod admin;
pub mod catalog;

use reelgear_catalog::CatalogCache;
use reelgear_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub use admin::{RefreshParams, health_impl, refresh_impl};
pub use catalog::{BrandsParams, ItemParams, ItemsParams, brands_impl, categories_impl, item_impl, items_impl, specs_impl};

/// Where a read was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Store,
}

/// Whether reads should be served from the cache.
pub(crate) async fn cache_ready(cache: &CatalogCache) -> bool {
    cache.is_loaded().await && !cache.snapshot().await.is_empty()
}

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(Error::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
