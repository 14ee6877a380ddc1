//! Catalog reference data.
//!
//! These are the shared equipment catalog entities (not a user's owned or
//! rented inventory). They serialize with camelCase keys, which is also the
//! layout of the persisted cache file.

use serde::{Deserialize, Serialize};

/// An equipment category (camera, lens, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A manufacturer. May have items in several categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
}

/// One brand-to-category association, derived from the catalog items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandLink {
    pub category_id: String,
    pub brand: Brand,
}

/// A definition in the shared equipment catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub brand_id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

/// Optional filters for item listings. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
}

impl ItemFilter {
    pub fn new(category_id: Option<String>, brand_id: Option<String>) -> Self {
        Self { category_id, brand_id }
    }

    /// Whether `item` passes both filters.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.category_id.as_deref().is_none_or(|c| c == item.category_id)
            && self.brand_id.as_deref().is_none_or(|b| b == item.brand_id)
    }
}
