//! Catalog read tools: categories, brands, items, a single item and its specs.

use reelgear_catalog::{CatalogCache, SpecsResolver};
use reelgear_core::{Brand, CatalogItem, CatalogStore, Category, Error, ItemFilter, Specs};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Source, cache_ready, json_result};

/// Parameters for the catalog_brands tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BrandsParams {
    /// Only brands having items in this category.
    #[serde(default)]
    pub category_id: Option<String>,
}

/// Parameters for the catalog_items tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ItemsParams {
    /// Restrict to one category.
    #[serde(default)]
    pub category_id: Option<String>,

    /// Restrict to one brand.
    #[serde(default)]
    pub brand_id: Option<String>,
}

/// Parameters for the catalog_item and catalog_item_specs tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ItemParams {
    /// Catalog item id.
    pub item_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesOutput {
    pub source: Source,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandsOutput {
    pub source: Source,
    pub brands: Vec<Brand>,
}

/// A catalog item with its specs inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemWithSpecs {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Empty when the category has no spec schema or the item has no spec row.
    pub specs: Specs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsOutput {
    pub source: Source,
    pub count: usize,
    pub items: Vec<ItemWithSpecs>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutput {
    pub source: Source,
    pub item: ItemWithSpecs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecsOutput {
    pub source: Source,
    pub item_id: String,
    pub specs: Specs,
}

fn require_item_id(params: &ItemParams) -> Result<&str, Error> {
    let id = params.item_id.trim();
    if id.is_empty() {
        return Err(Error::InvalidInput("item_id cannot be empty".into()));
    }
    Ok(id)
}

/// Implementation of the catalog_categories tool.
pub async fn categories_impl(cache: &CatalogCache, store: &dyn CatalogStore) -> Result<CallToolResult, McpError> {
    let output = if cache_ready(cache).await {
        CategoriesOutput { source: Source::Cache, categories: cache.get_categories().await }
    } else {
        CategoriesOutput { source: Source::Store, categories: store.categories().await? }
    };
    json_result(&output)
}

/// Implementation of the catalog_brands tool.
pub async fn brands_impl(
    cache: &CatalogCache, store: &dyn CatalogStore, params: BrandsParams,
) -> Result<CallToolResult, McpError> {
    let category_id = params.category_id.as_deref();
    let output = if cache_ready(cache).await {
        BrandsOutput { source: Source::Cache, brands: cache.get_brands(category_id).await }
    } else {
        BrandsOutput { source: Source::Store, brands: store.brands(category_id).await? }
    };
    json_result(&output)
}

/// Implementation of the catalog_items tool.
pub async fn items_impl(
    cache: &CatalogCache, store: &dyn CatalogStore, params: ItemsParams,
) -> Result<CallToolResult, McpError> {
    let (source, items): (Source, Vec<ItemWithSpecs>) = if cache_ready(cache).await {
        let snapshot = cache.snapshot().await;
        let filter = ItemFilter::new(params.category_id, params.brand_id);
        let items = snapshot
            .items(&filter)
            .into_iter()
            .map(|item| {
                let specs = snapshot.specs(&item.id).unwrap_or_default();
                ItemWithSpecs { item, specs }
            })
            .collect();
        (Source::Cache, items)
    } else {
        let items = store.items(&ItemFilter::new(params.category_id, params.brand_id)).await?;
        let ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        let mut specs = SpecsResolver::new(store).resolve_batch(&ids).await;
        let items = items
            .into_iter()
            .map(|item| {
                let specs = specs.remove(&item.id).unwrap_or_default();
                ItemWithSpecs { item, specs }
            })
            .collect();
        (Source::Store, items)
    };

    json_result(&ItemsOutput { source, count: items.len(), items })
}

/// Implementation of the catalog_item tool.
///
/// A cache miss falls through to the store so items added since the last
/// warm are still reachable.
pub async fn item_impl(
    cache: &CatalogCache, store: &dyn CatalogStore, params: ItemParams,
) -> Result<CallToolResult, McpError> {
    let id = require_item_id(&params)?;

    if cache_ready(cache).await
        && let Some(item) = cache.get_item(id).await
    {
        let specs = cache.get_specs(id).await.unwrap_or_default();
        return json_result(&ItemOutput { source: Source::Cache, item: ItemWithSpecs { item, specs } });
    }

    let item = store
        .item(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("catalog item {id}")))?;
    let specs = SpecsResolver::new(store).resolve_one(id).await;
    json_result(&ItemOutput { source: Source::Store, item: ItemWithSpecs { item, specs } })
}

/// Implementation of the catalog_item_specs tool.
pub async fn specs_impl(
    cache: &CatalogCache, store: &dyn CatalogStore, params: ItemParams,
) -> Result<CallToolResult, McpError> {
    let id = require_item_id(&params)?;

    if cache_ready(cache).await && cache.get_item(id).await.is_some() {
        let specs = cache.get_specs(id).await.unwrap_or_default();
        return json_result(&SpecsOutput { source: Source::Cache, item_id: id.to_string(), specs });
    }

    if store.item(id).await?.is_none() {
        return Err(Error::NotFound(format!("catalog item {id}")).into());
    }
    let specs = SpecsResolver::new(store).resolve_one(id).await;
    json_result(&SpecsOutput { source: Source::Store, item_id: id.to_string(), specs })
}
