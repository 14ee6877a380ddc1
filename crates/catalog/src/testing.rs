//! Shared test fixtures: a seeded in-memory catalog and store wrappers that
//! count or fail queries.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reelgear_core::{
    Brand, BrandLink, CatalogDb, CatalogItem, CatalogStore, Category, Error, ItemFilter, SpecKind, SpecRecord,
    SpecValue, Specs,
};

pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn specs(pairs: &[(&str, &str)]) -> Specs {
    pairs.iter().map(|(k, v)| (k.to_string(), SpecValue::from(*v))).collect()
}

pub async fn seed_item(db: &CatalogDb, id: &str, brand_id: &str, category_id: &str, name: &str) {
    db.upsert_item(&CatalogItem {
        id: id.into(),
        brand_id: brand_id.into(),
        category_id: category_id.into(),
        name: name.into(),
        description: None,
        image_url: None,
        created_at: "2024-05-01T10:00:00Z".into(),
    })
    .await
    .unwrap();
}

/// Categories camera, lens and catering (no spec schema); brands ARRI, Zeiss
/// and Sony. Items:
///
/// - g1: ARRI lens with specs
/// - g2: Zeiss lens without a spec row
/// - g3: ARRI camera with specs
/// - g4: Sony catering item
pub async fn seed() -> CatalogDb {
    let db = CatalogDb::open_in_memory().await.unwrap();
    for (id, name, slug) in [
        ("cat-camera", "Cameras", "camera"),
        ("cat-lens", "Lenses", "lens"),
        ("cat-catering", "Catering", "catering"),
    ] {
        db.upsert_category(&Category { id: id.into(), name: name.into(), slug: slug.into() })
            .await
            .unwrap();
    }
    for (id, name) in [("brand-arri", "ARRI"), ("brand-zeiss", "Zeiss"), ("brand-sony", "Sony")] {
        db.upsert_brand(&Brand { id: id.into(), name: name.into() }).await.unwrap();
    }

    seed_item(&db, "g1", "brand-arri", "cat-lens", "Signature Prime 35mm").await;
    seed_item(&db, "g2", "brand-zeiss", "cat-lens", "Supreme Prime 50mm").await;
    seed_item(&db, "g3", "brand-arri", "cat-camera", "Alexa Mini LF").await;
    seed_item(&db, "g4", "brand-sony", "cat-catering", "Espresso Cart").await;

    let lens = specs(&[("focalLength", "35mm"), ("aperture", "T1.8"), ("mount", "LPL")]);
    db.upsert_specs("g1", &SpecKind::Lens.record_from_specs(&lens)).await.unwrap();
    let camera = specs(&[("sensor", "LF"), ("dynamicRange", "14 stops"), ("nativeIso", "800"), ("mount", "LPL")]);
    db.upsert_specs("g3", &SpecKind::Camera.record_from_specs(&camera)).await.unwrap();

    db
}

/// One category per registered kind, each holding an item with a spec row
/// (weight "1kg") and an item without one.
///
/// Returns the store, the ids with specs, and the ids without.
pub async fn every_kind_catalog() -> (CatalogDb, Vec<String>, Vec<String>) {
    let db = CatalogDb::open_in_memory().await.unwrap();
    db.upsert_brand(&Brand { id: "brand-any".into(), name: "Any".into() }).await.unwrap();

    let mut with_specs = Vec::new();
    let mut without_specs = Vec::new();
    for kind in SpecKind::ALL {
        let slug = kind.slug();
        let category_id = format!("cat-{slug}");
        db.upsert_category(&Category { id: category_id.clone(), name: slug.to_uppercase(), slug: slug.into() })
            .await
            .unwrap();

        let with = format!("{slug}-1");
        let without = format!("{slug}-2");
        seed_item(&db, &with, "brand-any", &category_id, &with).await;
        seed_item(&db, &without, "brand-any", &category_id, &without).await;
        db.upsert_specs(&with, &kind.record_from_specs(&specs(&[("weight", "1kg")])))
            .await
            .unwrap();

        with_specs.push(with);
        without_specs.push(without);
    }
    (db, with_specs, without_specs)
}

/// `n` lenses `lens-0000`.. each with a spec row whose focal length is its
/// index in millimetres. Returns the store and the ids.
pub async fn bulk_lens_catalog(n: usize) -> (CatalogDb, Vec<String>) {
    let db = CatalogDb::open_in_memory().await.unwrap();
    db.upsert_category(&Category { id: "cat-lens".into(), name: "Lenses".into(), slug: "lens".into() })
        .await
        .unwrap();
    db.upsert_brand(&Brand { id: "brand-zeiss".into(), name: "Zeiss".into() }).await.unwrap();

    let mut lens_ids = Vec::with_capacity(n);
    for i in 0..n {
        let id = format!("lens-{i:04}");
        seed_item(&db, &id, "brand-zeiss", "cat-lens", &format!("Prime {i}mm")).await;
        let focal = format!("{i}mm");
        db.upsert_specs(&id, &SpecKind::Lens.record_from_specs(&specs(&[("focalLength", &focal)])))
            .await
            .unwrap();
        lens_ids.push(id);
    }
    (db, lens_ids)
}

/// Wraps a store and counts slug and spec queries.
pub struct CountingStore<S> {
    inner: S,
    slug_queries: AtomicUsize,
    spec_queries: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, slug_queries: AtomicUsize::new(0), spec_queries: AtomicUsize::new(0) }
    }

    pub fn slug_queries(&self) -> usize {
        self.slug_queries.load(Ordering::SeqCst)
    }

    pub fn spec_queries(&self) -> usize {
        self.spec_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: CatalogStore> CatalogStore for CountingStore<S> {
    async fn categories(&self) -> Result<Vec<Category>, Error> {
        self.inner.categories().await
    }

    async fn brand_links(&self) -> Result<Vec<BrandLink>, Error> {
        self.inner.brand_links().await
    }

    async fn brands(&self, category_id: Option<&str>) -> Result<Vec<Brand>, Error> {
        self.inner.brands(category_id).await
    }

    async fn items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, Error> {
        self.inner.items(filter).await
    }

    async fn item(&self, id: &str) -> Result<Option<CatalogItem>, Error> {
        self.inner.item(id).await
    }

    async fn category_slug(&self, item_id: &str) -> Result<Option<String>, Error> {
        self.slug_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.category_slug(item_id).await
    }

    async fn category_slugs(&self, item_ids: &[String]) -> Result<HashMap<String, String>, Error> {
        self.slug_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.category_slugs(item_ids).await
    }

    async fn spec_rows(&self, kind: SpecKind, item_ids: &[String]) -> Result<Vec<(String, SpecRecord)>, Error> {
        self.spec_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.spec_rows(kind, item_ids).await
    }
}

/// Which store call a [`FailingStore`] rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    None,
    Categories,
    BrandLinks,
    Items,
    CategorySlugs,
    SpecRows,
}

/// Wraps a [`CatalogDb`] and fails one kind of call, switchable at runtime.
pub struct FailingStore {
    inner: CatalogDb,
    failure: Mutex<Failure>,
}

impl FailingStore {
    pub fn new(inner: CatalogDb, failure: Failure) -> Self {
        Self { inner, failure: Mutex::new(failure) }
    }

    pub fn inner(&self) -> &CatalogDb {
        &self.inner
    }

    pub fn fail(&self, failure: Failure) {
        *self.failure.lock().unwrap() = failure;
    }

    fn check(&self, call: Failure) -> Result<(), Error> {
        if *self.failure.lock().unwrap() == call {
            Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogStore for FailingStore {
    async fn categories(&self) -> Result<Vec<Category>, Error> {
        self.check(Failure::Categories)?;
        self.inner.categories().await
    }

    async fn brand_links(&self) -> Result<Vec<BrandLink>, Error> {
        self.check(Failure::BrandLinks)?;
        self.inner.brand_links().await
    }

    async fn brands(&self, category_id: Option<&str>) -> Result<Vec<Brand>, Error> {
        self.inner.brands(category_id).await
    }

    async fn items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, Error> {
        self.check(Failure::Items)?;
        self.inner.items(filter).await
    }

    async fn item(&self, id: &str) -> Result<Option<CatalogItem>, Error> {
        self.check(Failure::Items)?;
        self.inner.item(id).await
    }

    async fn category_slug(&self, item_id: &str) -> Result<Option<String>, Error> {
        self.check(Failure::CategorySlugs)?;
        self.inner.category_slug(item_id).await
    }

    async fn category_slugs(&self, item_ids: &[String]) -> Result<HashMap<String, String>, Error> {
        self.check(Failure::CategorySlugs)?;
        self.inner.category_slugs(item_ids).await
    }

    async fn spec_rows(&self, kind: SpecKind, item_ids: &[String]) -> Result<Vec<(String, SpecRecord)>, Error> {
        self.check(Failure::SpecRows)?;
        self.inner.spec_rows(kind, item_ids).await
    }
}
