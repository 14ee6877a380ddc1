//! Schema-driven spec lookup.
//!
//! Resolves catalog items to their category-specific specs and normalizes
//! them into [`Specs`]. The batch path groups items by category kind and
//! issues one spec query per kind actually present, so a request never costs
//! more than one slug query plus twelve spec queries however many items it
//! names.
//!
//! Specs are decorative: lookup failures are logged and the affected items
//! simply come back without specs. Neither path returns an error.

use std::collections::{BTreeMap, BTreeSet};

use reelgear_core::{CatalogStore, SpecKind, Specs};

/// Specs keyed by catalog item id.
pub type SpecsById = BTreeMap<String, Specs>;

/// Spec lookups against a [`CatalogStore`].
pub struct SpecsResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: CatalogStore + ?Sized> SpecsResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Specs of a single item.
    ///
    /// Returns an empty map when the item or its category cannot be resolved,
    /// when the category has no spec schema, when there is no spec row, or
    /// when any lookup fails.
    pub async fn resolve_one(&self, item_id: &str) -> Specs {
        let slug = match self.store.category_slug(item_id).await {
            Ok(Some(slug)) => slug,
            Ok(None) => return Specs::new(),
            Err(e) => {
                tracing::warn!(item_id, error = %e, "failed to resolve item category");
                return Specs::new();
            }
        };

        let Some(kind) = SpecKind::from_slug(&slug) else {
            return Specs::new();
        };

        match self.store.spec_rows(kind, &[item_id.to_string()]).await {
            Ok(rows) => rows
                .into_iter()
                .find(|(id, _)| id == item_id)
                .map(|(_, record)| record.into_specs())
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(item_id, category = kind.slug(), error = %e, "failed to fetch specs");
                Specs::new()
            }
        }
    }

    /// Specs of many items: one slug query, then one spec query per kind.
    ///
    /// The result has an entry only for items with a spec row. Like
    /// [`resolve_one`](Self::resolve_one) this never fails: if the slug lookup
    /// fails nothing is resolved, and a failed spec query only drops its kind.
    pub async fn resolve_batch(&self, item_ids: &[String]) -> SpecsById {
        if item_ids.is_empty() {
            return SpecsById::new();
        }

        let slugs = match self.store.category_slugs(item_ids).await {
            Ok(slugs) => slugs,
            Err(e) => {
                tracing::warn!(items = item_ids.len(), error = %e, "failed to resolve item categories; items left without specs");
                return SpecsById::new();
            }
        };

        let mut groups: BTreeMap<SpecKind, BTreeSet<String>> = BTreeMap::new();
        for id in item_ids {
            if let Some(kind) = slugs.get(id).and_then(|slug| SpecKind::from_slug(slug)) {
                groups.entry(kind).or_default().insert(id.clone());
            }
        }

        self.fetch_groups(groups).await
    }

    async fn fetch_groups(&self, groups: BTreeMap<SpecKind, BTreeSet<String>>) -> SpecsById {
        let mut specs_by_id = SpecsById::new();
        for (kind, ids) in groups {
            let ids: Vec<String> = ids.into_iter().collect();
            match self.store.spec_rows(kind, &ids).await {
                Ok(rows) => {
                    tracing::debug!(category = kind.slug(), requested = ids.len(), found = rows.len(), "fetched specs");
                    for (id, record) in rows {
                        specs_by_id.insert(id, record.into_specs());
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        category = kind.slug(),
                        items = ids.len(),
                        error = %e,
                        "failed to fetch specs; items left without specs"
                    );
                }
            }
        }
        specs_by_id
    }
}
