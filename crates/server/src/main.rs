//! reelgear server entry point.
//!
//! Boots the catalog cache and serves the MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use reelgear_catalog::{CatalogCache, spawn_daily_refresh};
use reelgear_core::{AppConfig, CatalogDb, CatalogStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        db_path = %config.db_path.display(),
        cache_file = %config.cache_file.display(),
        refresh_hour = config.refresh_hour,
        "Starting reelgear server on stdio transport"
    );

    let db = CatalogDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening catalog database {}", config.db_path.display()))?;
    if let Some(seed_file) = &config.seed_file {
        db.import_file(seed_file)
            .await
            .with_context(|| format!("importing catalog seed {}", seed_file.display()))?;
    }
    let store: Arc<dyn CatalogStore> = Arc::new(db);

    let cache = Arc::new(CatalogCache::new(&config.cache_file).with_max_staleness(config.max_staleness()));
    cache.load().await;

    if config.warm_on_startup
        && let Err(e) = cache.warm_from_db(store.as_ref()).await
    {
        tracing::warn!(error = %e, "startup warm failed; serving persisted snapshot or falling back to the database");
    }

    let refresher = spawn_daily_refresh(Arc::clone(&cache), Arc::clone(&store), config.refresh_hour);

    let handler = handler::CatalogServer::new(cache, store, config.admin_token.clone());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    refresher.abort();

    Ok(())
}
