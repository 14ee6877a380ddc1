//! [`CatalogStore`] read queries for [`CatalogDb`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Row, params_from_iter};

use super::{CatalogDb, CatalogStore};
use crate::Error;
use crate::models::{Brand, BrandLink, CatalogItem, Category, ItemFilter};
use crate::specs::{SpecKind, SpecRecord};

const ITEM_COLUMNS: &str = "id, brand_id, category_id, name, description, image_url, created_at";

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogItem> {
    Ok(CatalogItem {
        id: row.get(0)?,
        brand_id: row.get(1)?,
        category_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        image_url: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Ids bound per `IN (...)` statement. Stays well below SQLite's host
/// parameter limit, which is 999 on older builds.
pub(crate) const MAX_IDS_PER_STATEMENT: usize = 500;

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[async_trait]
impl CatalogStore for CatalogDb {
    async fn categories(&self) -> Result<Vec<Category>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Category>, Error> {
                let mut stmt = conn.prepare("SELECT id, name, slug FROM categories ORDER BY name, id")?;
                let rows = stmt.query_map([], |row| Ok(Category { id: row.get(0)?, name: row.get(1)?, slug: row.get(2)? }))?;
                let categories = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(categories)
            })
            .await
            .map_err(Error::from)
    }

    async fn brand_links(&self) -> Result<Vec<BrandLink>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<BrandLink>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT DISTINCT gc.category_id, b.id, b.name
                    FROM gear_catalog gc
                    JOIN brands b ON b.id = gc.brand_id
                    ORDER BY gc.category_id, b.name",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(BrandLink { category_id: row.get(0)?, brand: Brand { id: row.get(1)?, name: row.get(2)? } })
                })?;
                let links = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(links)
            })
            .await
            .map_err(Error::from)
    }

    async fn brands(&self, category_id: Option<&str>) -> Result<Vec<Brand>, Error> {
        let category_id = category_id.filter(|c| !c.is_empty()).map(str::to_string);
        self.conn
            .call(move |conn| -> Result<Vec<Brand>, Error> {
                let map = |row: &Row<'_>| Ok(Brand { id: row.get(0)?, name: row.get(1)? });
                let brands = match category_id {
                    Some(category_id) => {
                        let mut stmt = conn.prepare(
                            "SELECT DISTINCT b.id, b.name
                            FROM brands b
                            JOIN gear_catalog gc ON gc.brand_id = b.id
                            WHERE gc.category_id = ?1
                            ORDER BY b.name",
                        )?;
                        let rows = stmt.query_map(params![category_id], map)?;
                        rows.collect::<Result<Vec<_>, _>>()?
                    }
                    None => {
                        let mut stmt = conn.prepare("SELECT id, name FROM brands ORDER BY name")?;
                        let rows = stmt.query_map([], map)?;
                        rows.collect::<Result<Vec<_>, _>>()?
                    }
                };
                Ok(brands)
            })
            .await
            .map_err(Error::from)
    }

    async fn items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, Error> {
        let mut sql = format!("SELECT {ITEM_COLUMNS} FROM gear_catalog WHERE 1=1");
        let mut args: Vec<String> = Vec::new();
        if let Some(category_id) = filter.category_id.as_deref().filter(|c| !c.is_empty()) {
            args.push(category_id.to_string());
            sql.push_str(&format!(" AND category_id = ?{}", args.len()));
        }
        if let Some(brand_id) = filter.brand_id.as_deref().filter(|b| !b.is_empty()) {
            args.push(brand_id.to_string());
            sql.push_str(&format!(" AND brand_id = ?{}", args.len()));
        }
        sql.push_str(" ORDER BY name, id");

        self.conn
            .call(move |conn| -> Result<Vec<CatalogItem>, Error> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(args.iter()), item_from_row)?;
                let items = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await
            .map_err(Error::from)
    }

    async fn item(&self, id: &str) -> Result<Option<CatalogItem>, Error> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CatalogItem>, Error> {
                let mut stmt = conn.prepare(&format!("SELECT {ITEM_COLUMNS} FROM gear_catalog WHERE id = ?1"))?;
                match stmt.query_row(params![id], item_from_row) {
                    Ok(item) => Ok(Some(item)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn category_slug(&self, item_id: &str) -> Result<Option<String>, Error> {
        let item_id = item_id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT c.slug FROM gear_catalog gc
                    JOIN categories c ON c.id = gc.category_id
                    WHERE gc.id = ?1",
                    params![item_id],
                    |row| row.get(0),
                );
                match result {
                    Ok(slug) => Ok(Some(slug)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn category_slugs(&self, item_ids: &[String]) -> Result<HashMap<String, String>, Error> {
        if item_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids = item_ids.to_vec();
        self.conn
            .call(move |conn| -> Result<HashMap<String, String>, Error> {
                let mut slugs = HashMap::with_capacity(ids.len());
                for chunk in ids.chunks(MAX_IDS_PER_STATEMENT) {
                    let sql = format!(
                        "SELECT gc.id, c.slug FROM gear_catalog gc
                        JOIN categories c ON c.id = gc.category_id
                        WHERE gc.id IN ({})",
                        placeholders(chunk.len())
                    );
                    let mut stmt = conn.prepare_cached(&sql)?;
                    let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })?;
                    for row in rows {
                        let (id, slug) = row?;
                        slugs.insert(id, slug);
                    }
                }
                Ok(slugs)
            })
            .await
            .map_err(Error::from)
    }

    async fn spec_rows(&self, kind: SpecKind, item_ids: &[String]) -> Result<Vec<(String, SpecRecord)>, Error> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = item_ids.to_vec();
        self.conn
            .call(move |conn| -> Result<Vec<(String, SpecRecord)>, Error> {
                let mut records = Vec::new();
                for chunk in ids.chunks(MAX_IDS_PER_STATEMENT) {
                    let mut stmt = conn.prepare_cached(&kind.select_sql(chunk.len()))?;
                    let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                        Ok((row.get::<_, String>(0)?, kind.decode(row)?))
                    })?;
                    for row in rows {
                        records.push(row?);
                    }
                }
                Ok(records)
            })
            .await
            .map_err(Error::from)
    }
}
