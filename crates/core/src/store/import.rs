//! Catalog import operations.
//!
//! Upserts for categories, brands, items and spec rows, plus [`CatalogImport`],
//! a JSON seed document loaded through [`CatalogDb::import_file`]. The catalog
//! itself is maintained elsewhere; these exist for seeding a local store.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::params_from_iter;

use super::{CatalogDb, CatalogStore};
use crate::Error;
use crate::models::{Brand, CatalogItem, Category};
use crate::specs::{SpecKind, SpecRecord, SpecValue, Specs};

/// A catalog seed document.
///
/// `specs` maps an item id to its flat camelCase specs; the target table is
/// picked from the item's category slug.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogImport {
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub items: Vec<CatalogItem>,
    pub specs: BTreeMap<String, Specs>,
}

/// Rows written by [`CatalogDb::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories: usize,
    pub brands: usize,
    pub items: usize,
    pub specs: usize,
    /// Spec entries whose item is unknown or whose category has no spec table.
    pub skipped_specs: usize,
}

impl CatalogDb {
    /// Upsert everything in `data`: categories, then brands, then items, then
    /// spec rows.
    ///
    /// # Errors
    ///
    /// Stops at the first failed upsert; rows written before it are kept.
    pub async fn import(&self, data: &CatalogImport) -> Result<ImportSummary, Error> {
        let mut summary = ImportSummary::default();

        for category in &data.categories {
            self.upsert_category(category).await?;
            summary.categories += 1;
        }
        for brand in &data.brands {
            self.upsert_brand(brand).await?;
            summary.brands += 1;
        }
        for item in &data.items {
            self.upsert_item(item).await?;
            summary.items += 1;
        }

        if data.specs.is_empty() {
            return Ok(summary);
        }
        let gear_ids: Vec<String> = data.specs.keys().cloned().collect();
        let slugs = self.category_slugs(&gear_ids).await?;
        for (gear_id, specs) in &data.specs {
            let Some(kind) = slugs.get(gear_id).and_then(|slug| SpecKind::from_slug(slug)) else {
                tracing::warn!(gear_id = %gear_id, slug = ?slugs.get(gear_id), "skipping specs without a spec table");
                summary.skipped_specs += 1;
                continue;
            };
            self.upsert_specs(gear_id, &kind.record_from_specs(specs)).await?;
            summary.specs += 1;
        }

        Ok(summary)
    }

    /// Read a [`CatalogImport`] JSON document from `path` and import it.
    ///
    /// # Errors
    ///
    /// `Persist` if the file cannot be read, `Serialization` if it is not a
    /// valid document, otherwise as [`CatalogDb::import`].
    pub async fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportSummary, Error> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let data: CatalogImport = serde_json::from_slice(&bytes)?;
        let summary = self.import(&data).await?;
        tracing::info!(
            path = %path.display(),
            categories = summary.categories,
            brands = summary.brands,
            items = summary.items,
            specs = summary.specs,
            skipped_specs = summary.skipped_specs,
            "imported catalog seed"
        );
        Ok(summary)
    }

    /// Insert or update a category.
    pub async fn upsert_category(&self, category: &Category) -> Result<(), Error> {
        let category = category.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO categories (id, name, slug) VALUES (?1, ?2, ?3)
                    ON CONFLICT(id) DO UPDATE SET name = excluded.name, slug = excluded.slug",
                    params![category.id, category.name, category.slug],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a brand.
    pub async fn upsert_brand(&self, brand: &Brand) -> Result<(), Error> {
        let brand = brand.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO brands (id, name) VALUES (?1, ?2)
                    ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                    params![brand.id, brand.name],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a catalog item. Its brand and category must exist.
    pub async fn upsert_item(&self, item: &CatalogItem) -> Result<(), Error> {
        let item = item.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO gear_catalog (id, brand_id, category_id, name, description, image_url, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(id) DO UPDATE SET
                        brand_id = excluded.brand_id,
                        category_id = excluded.category_id,
                        name = excluded.name,
                        description = excluded.description,
                        image_url = excluded.image_url,
                        created_at = excluded.created_at",
                    params![
                        item.id,
                        item.brand_id,
                        item.category_id,
                        item.name,
                        item.description,
                        item.image_url,
                        item.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the spec row of `gear_id` in the record's table.
    pub async fn upsert_specs(&self, gear_id: &str, record: &SpecRecord) -> Result<(), Error> {
        let kind = record.kind();
        let columns = kind.columns();
        let quoted: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
        let updates: Vec<String> = quoted.iter().map(|c| format!("{c} = excluded.{c}")).collect();
        let sql = format!(
            "INSERT INTO {} (gear_id, {}) VALUES (?1, {})
            ON CONFLICT(gear_id) DO UPDATE SET {}",
            kind.table(),
            quoted.join(", "),
            (2..=columns.len() + 1).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", "),
            updates.join(", "),
        );

        let mut values = vec![SpecValue::Text(gear_id.to_string())];
        values.extend(record.values().into_iter().cloned());

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(&sql, params_from_iter(values.iter()))?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
