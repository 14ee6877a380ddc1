//! The cached catalog snapshot.
//!
//! A snapshot is produced in full by a warm (or read back from disk) and is
//! never mutated afterwards; the cache swaps whole snapshots.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use reelgear_core::{Brand, BrandLink, CatalogItem, Category, ItemFilter, Specs};
use serde::{Deserialize, Serialize};

use crate::resolver::SpecsById;

/// Complete, internally consistent set of cached catalog entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Brands having items in each category, keyed by category id.
    #[serde(default)]
    pub brands_by_category: BTreeMap<String, Vec<Brand>>,
    #[serde(default)]
    pub items_by_id: BTreeMap<String, CatalogItem>,
    /// Only items with a known spec schema and a spec row appear here.
    #[serde(default)]
    pub specs_by_gear_id: SpecsById,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    /// Derived from `brands_by_category`; rebuilt by [`Snapshot::reindex`].
    #[serde(skip)]
    pub(crate) brands_by_id: BTreeMap<String, Brand>,
}

impl Snapshot {
    /// Assemble a snapshot from freshly fetched store data.
    pub fn build(
        categories: Vec<Category>, links: Vec<BrandLink>, items: Vec<CatalogItem>, specs: SpecsById,
        last_update: DateTime<Utc>,
    ) -> Self {
        let mut snapshot = Self {
            categories,
            brands_by_category: group_brands(links),
            items_by_id: items.into_iter().map(|item| (item.id.clone(), item)).collect(),
            specs_by_gear_id: specs,
            last_update: Some(last_update),
            brands_by_id: BTreeMap::new(),
        };
        snapshot.reindex();
        snapshot
    }

    /// Rebuild the brand id index. Needed after deserializing or after
    /// editing `brands_by_category` directly.
    pub fn reindex(&mut self) {
        self.brands_by_id = self
            .brands_by_category
            .values()
            .flatten()
            .map(|brand| (brand.id.clone(), brand.clone()))
            .collect();
    }

    /// Whether there is anything worth serving.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.items_by_id.is_empty()
    }

    /// Brands of one category, or the de-duplicated union over all categories.
    pub fn brands(&self, category_id: Option<&str>) -> Vec<Brand> {
        match category_id {
            Some(category_id) => self.brands_by_category.get(category_id).cloned().unwrap_or_default(),
            None => {
                let mut seen = HashSet::new();
                self.brands_by_category
                    .values()
                    .flatten()
                    .filter(|brand| seen.insert(brand.id.as_str()))
                    .cloned()
                    .collect()
            }
        }
    }

    pub fn brand(&self, brand_id: &str) -> Option<Brand> {
        self.brands_by_id.get(brand_id).cloned()
    }

    /// Items passing `filter`, ordered by (name, id).
    pub fn items(&self, filter: &ItemFilter) -> Vec<CatalogItem> {
        let mut items: Vec<CatalogItem> = self.items_by_id.values().filter(|i| filter.matches(i)).cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        items
    }

    pub fn specs(&self, item_id: &str) -> Option<Specs> {
        self.specs_by_gear_id.get(item_id).cloned()
    }

    /// Number of distinct brands across all categories.
    pub fn brand_count(&self) -> usize {
        self.brands_by_id.len()
    }
}

/// Group brand links by category, keeping the first occurrence of each brand
/// id within a category. The same brand may appear under several categories.
pub fn group_brands(links: Vec<BrandLink>) -> BTreeMap<String, Vec<Brand>> {
    let mut grouped: BTreeMap<String, Vec<Brand>> = BTreeMap::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for BrandLink { category_id, brand } in links {
        if seen.insert((category_id.clone(), brand.id.clone())) {
            grouped.entry(category_id).or_default().push(brand);
        }
    }
    grouped
}
