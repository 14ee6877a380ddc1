//! catalog_health and catalog_refresh tool implementations.

use reelgear_catalog::{CatalogCache, refresh_now};
use reelgear_core::{CatalogStore, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::json_result;

/// Parameters for the catalog_refresh tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefreshParams {
    /// Administrative token.
    pub token: String,
}

/// Compare SHA-256 digests so the comparison does not depend on where the
/// inputs first differ.
fn token_matches(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Implementation of the catalog_health tool.
pub async fn health_impl(cache: &CatalogCache) -> Result<CallToolResult, McpError> {
    json_result(&cache.get_stats().await)
}

/// Implementation of the catalog_refresh tool.
///
/// Disabled when no admin token is configured.
pub async fn refresh_impl(
    cache: &CatalogCache, store: &dyn CatalogStore, admin_token: Option<&str>, params: RefreshParams,
) -> Result<CallToolResult, McpError> {
    let Some(expected) = admin_token else {
        return Err(Error::Unauthorized("manual refresh is disabled".into()).into());
    };
    if !token_matches(&params.token, expected) {
        tracing::warn!("rejected catalog refresh with invalid token");
        return Err(Error::Unauthorized("invalid token".into()).into());
    }

    tracing::info!("manual catalog refresh requested");
    let stats = refresh_now(cache, store).await?;
    json_result(&stats)
}
