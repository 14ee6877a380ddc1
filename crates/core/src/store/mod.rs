//! The authoritative catalog store.
//!
//! [`CatalogStore`] is the read contract the cache, the specs resolver and
//! the handler fallbacks are written against. [`CatalogDb`] implements it on
//! SQLite with async access via tokio-rusqlite:
//!
//! - Automatic schema migrations (catalog tables plus the twelve spec tables)
//! - WAL mode for concurrent access
//! - Import upserts and a JSON seed document loader

pub mod connection;
pub mod import;
pub mod migrations;
pub mod queries;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::Error;
use crate::models::{Brand, BrandLink, CatalogItem, Category, ItemFilter};
use crate::specs::{SpecKind, SpecRecord};

pub use connection::CatalogDb;
pub use import::{CatalogImport, ImportSummary};

/// Read queries against the catalog.
///
/// Implementations perform exactly one store round trip per call; callers
/// rely on that to bound query fan-out.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All categories ordered by name.
    async fn categories(&self) -> Result<Vec<Category>, Error>;

    /// Every brand-to-category association derived from catalog items.
    ///
    /// May contain duplicates; consumers de-duplicate.
    async fn brand_links(&self) -> Result<Vec<BrandLink>, Error>;

    /// All brands, or the distinct brands having items in `category_id`.
    async fn brands(&self, category_id: Option<&str>) -> Result<Vec<Brand>, Error>;

    /// Catalog items matching `filter`, ordered by name.
    async fn items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, Error>;

    /// A single item, `None` if absent.
    async fn item(&self, id: &str) -> Result<Option<CatalogItem>, Error>;

    /// Category slug of one item, `None` if the item or its category is unknown.
    async fn category_slug(&self, item_id: &str) -> Result<Option<String>, Error>;

    /// Category slugs for many items in one query. Unresolvable ids are omitted.
    async fn category_slugs(&self, item_ids: &[String]) -> Result<HashMap<String, String>, Error>;

    /// Spec rows of `kind` for the given items, as (item id, record).
    async fn spec_rows(&self, kind: SpecKind, item_ids: &[String]) -> Result<Vec<(String, SpecRecord)>, Error>;
}
