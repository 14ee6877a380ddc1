//! In-memory catalog cache with disk persistence.
//!
//! One [`CatalogCache`] exists per process. It holds the current
//! [`Snapshot`] behind a reader/writer lock and replaces it wholesale:
//!
//! - [`CatalogCache::load`] installs the persisted snapshot, if any
//! - [`CatalogCache::warm_from_db`] rebuilds the snapshot from the store
//! - reads clone out of whichever snapshot is current
//!
//! Warms are serialized by their own mutex and build the new snapshot off to
//! the side; the reader lock is taken exclusively only for the swap. A warm
//! that fails at any step publishes nothing.
//!
//! The cache never reports "no data" as an error. Callers check
//! [`CatalogCache::is_loaded`] and the emptiness of results, and fall back to
//! the store themselves.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reelgear_core::{Brand, CatalogItem, CatalogStore, Category, Error, ItemFilter, Specs};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::persist;
use crate::resolver::SpecsResolver;
use crate::snapshot::Snapshot;

/// Default age after which [`CacheStats::stale`] turns true.
pub const DEFAULT_MAX_STALENESS: Duration = Duration::from_secs(25 * 3600);

/// Health and monitoring view of the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub loaded: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub categories_count: usize,
    pub brands_count: usize,
    pub items_count: usize,
    pub specs_count: usize,
    pub cache_file: PathBuf,
    pub cache_file_exists: bool,
    /// No successful warm yet, or the last one is older than the staleness bound.
    pub stale: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    loaded: bool,
    snapshot: Arc<Snapshot>,
}

/// The process-wide catalog cache.
#[derive(Debug)]
pub struct CatalogCache {
    state: RwLock<CacheState>,
    warm_lock: Mutex<()>,
    file_path: PathBuf,
    max_staleness: Duration,
}

impl CatalogCache {
    /// An unloaded, empty cache persisting to `file_path`.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            warm_lock: Mutex::new(()),
            file_path: file_path.into(),
            max_staleness: DEFAULT_MAX_STALENESS,
        }
    }

    pub fn with_max_staleness(mut self, max_staleness: Duration) -> Self {
        self.max_staleness = max_staleness;
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Install the persisted snapshot, if it can be read.
    ///
    /// A missing or corrupt file is a cold start: the snapshot stays empty.
    /// Either way the cache is marked loaded afterwards.
    pub async fn load(&self) {
        let _warm = self.warm_lock.lock().await;

        let restored = match persist::read_snapshot(&self.file_path).await {
            Ok(snapshot) => {
                tracing::info!(
                    path = %self.file_path.display(),
                    categories = snapshot.categories.len(),
                    items = snapshot.items_by_id.len(),
                    specs = snapshot.specs_by_gear_id.len(),
                    last_update = ?snapshot.last_update,
                    "loaded catalog snapshot from disk"
                );
                Some(snapshot)
            }
            Err(Error::Persist(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.file_path.display(), "no persisted catalog snapshot; starting cold");
                None
            }
            Err(e) => {
                tracing::warn!(path = %self.file_path.display(), error = %e, "ignoring unreadable catalog snapshot");
                None
            }
        };

        let mut state = self.state.write().await;
        if let Some(snapshot) = restored {
            state.snapshot = Arc::new(snapshot);
        }
        state.loaded = true;
    }

    /// Rebuild the snapshot from `store` and persist it.
    ///
    /// Fetches categories, brand links, all items and their specs in that
    /// order. An error fetching categories, brand links or items aborts the
    /// warm and leaves the current snapshot in place. Specs that cannot be
    /// fetched are left out. Concurrent warms run one after another.
    ///
    /// A failure to write the snapshot file is logged but does not fail the
    /// warm; the in-memory snapshot has already been replaced.
    pub async fn warm_from_db<S: CatalogStore + ?Sized>(&self, store: &S) -> Result<(), Error> {
        let _warm = self.warm_lock.lock().await;
        let started = Instant::now();

        let categories = store.categories().await?;
        let links = store.brand_links().await?;
        let items = store.items(&ItemFilter::default()).await?;
        let item_ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        let specs = SpecsResolver::new(store).resolve_batch(&item_ids).await;

        let previous = self.state.read().await.snapshot.last_update;
        let snapshot = Arc::new(Snapshot::build(categories, links, items, specs, next_stamp(previous)));

        {
            let mut state = self.state.write().await;
            state.snapshot = Arc::clone(&snapshot);
            state.loaded = true;
        }

        tracing::info!(
            categories = snapshot.categories.len(),
            brands = snapshot.brand_count(),
            items = snapshot.items_by_id.len(),
            specs = snapshot.specs_by_gear_id.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog cache warmed"
        );

        if let Err(e) = persist::write_snapshot(&self.file_path, &snapshot).await {
            tracing::warn!(path = %self.file_path.display(), error = %e, "failed to persist catalog snapshot");
        }

        Ok(())
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    /// The current snapshot. Cheap: shares the underlying data.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read().await.snapshot)
    }

    pub async fn get_categories(&self) -> Vec<Category> {
        self.snapshot().await.categories.clone()
    }

    /// Brands of one category, or all distinct brands when `category_id` is `None`.
    pub async fn get_brands(&self, category_id: Option<&str>) -> Vec<Brand> {
        self.snapshot().await.brands(category_id)
    }

    pub async fn get_items(&self, category_id: Option<&str>, brand_id: Option<&str>) -> Vec<CatalogItem> {
        let filter = ItemFilter::new(category_id.map(str::to_string), brand_id.map(str::to_string));
        self.snapshot().await.items(&filter)
    }

    pub async fn get_item(&self, item_id: &str) -> Option<CatalogItem> {
        self.snapshot().await.items_by_id.get(item_id).cloned()
    }

    /// `None` when the item has no cached specs.
    pub async fn get_specs(&self, item_id: &str) -> Option<Specs> {
        self.snapshot().await.specs(item_id)
    }

    pub async fn get_brand_by_id(&self, brand_id: &str) -> Option<Brand> {
        self.snapshot().await.brand(brand_id)
    }

    pub async fn get_stats(&self) -> CacheStats {
        let (loaded, snapshot) = {
            let state = self.state.read().await;
            (state.loaded, Arc::clone(&state.snapshot))
        };
        let cache_file_exists = tokio::fs::try_exists(&self.file_path).await.unwrap_or(false);

        CacheStats {
            loaded,
            last_update: snapshot.last_update,
            categories_count: snapshot.categories.len(),
            brands_count: snapshot.brand_count(),
            items_count: snapshot.items_by_id.len(),
            specs_count: snapshot.specs_by_gear_id.len(),
            cache_file: self.file_path.clone(),
            cache_file_exists,
            stale: is_stale(snapshot.last_update, Utc::now(), self.max_staleness),
        }
    }
}

/// Timestamp for a new snapshot, strictly after `previous` even if the
/// wall clock has not advanced or stepped back.
fn next_stamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev => prev + chrono::Duration::microseconds(1),
        _ => now,
    }
}

fn is_stale(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>, max_staleness: Duration) -> bool {
    match last_update {
        None => true,
        Some(at) => now
            .signed_duration_since(at)
            .to_std()
            .is_ok_and(|age| age > max_staleness),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingStore, Failure, seed, seed_item};
    use reelgear_core::SpecValue;

    fn cache_in(dir: &tempfile::TempDir) -> CatalogCache {
        CatalogCache::new(dir.path().join("data/catalog_cache.json"))
    }

    #[tokio::test]
    async fn test_load_missing_file_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        assert!(!cache.is_loaded().await);

        cache.load().await;

        assert!(cache.is_loaded().await);
        assert!(cache.get_categories().await.is_empty());
        let stats = cache.get_stats().await;
        assert!(stats.loaded);
        assert!(stats.stale);
        assert!(!stats.cache_file_exists);
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        tokio::fs::create_dir_all(cache.file_path().parent().unwrap()).await.unwrap();
        tokio::fs::write(cache.file_path(), b"[1, 2").await.unwrap();

        cache.load().await;

        assert!(cache.is_loaded().await);
        assert!(cache.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_warm_populates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed().await;
        let cache = cache_in(&dir);

        cache.warm_from_db(&db).await.unwrap();

        assert!(cache.is_loaded().await);
        assert_eq!(cache.get_categories().await.len(), 3);
        assert_eq!(cache.get_items(None, None).await.len(), 4);
        assert_eq!(cache.get_items(Some("cat-lens"), None).await.len(), 2);
        assert_eq!(cache.get_items(Some("cat-lens"), Some("brand-zeiss")).await.len(), 1);
        assert_eq!(cache.get_item("g3").await.unwrap().name, "Alexa Mini LF");
        assert!(cache.get_item("missing").await.is_none());
        assert_eq!(cache.get_brand_by_id("brand-zeiss").await.unwrap().name, "Zeiss");

        let specs = cache.get_specs("g3").await.unwrap();
        assert_eq!(specs["dynamicRange"], SpecValue::from("14 stops"));
        assert!(cache.get_specs("g2").await.is_none());
        assert!(cache.get_specs("g4").await.is_none());

        let stats = cache.get_stats().await;
        assert_eq!(stats.categories_count, 3);
        assert_eq!(stats.brands_count, 3);
        assert_eq!(stats.items_count, 4);
        assert_eq!(stats.specs_count, 2);
        assert!(stats.cache_file_exists);
        assert!(!stats.stale);
    }

    #[tokio::test]
    async fn test_brand_union_has_no_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed().await;
        let cache = cache_in(&dir);
        cache.warm_from_db(&db).await.unwrap();

        // ARRI sells in both lens and camera.
        let brands = cache.get_brands(None).await;
        let mut ids: Vec<_> = brands.iter().map(|b| b.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), brands.len());
        assert_eq!(brands.len(), 3);

        assert_eq!(cache.get_brands(Some("cat-camera")).await.len(), 1);
        assert_eq!(cache.get_brands(Some("cat-lens")).await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_warm_leaves_snapshot_untouched() {
        for failure in [Failure::Categories, Failure::BrandLinks, Failure::Items] {
            let dir = tempfile::tempdir().unwrap();
            let store = FailingStore::new(seed().await, Failure::None);
            let cache = cache_in(&dir);
            cache.warm_from_db(&store).await.unwrap();

            let categories = serde_json::to_string(&cache.get_categories().await).unwrap();
            let items = serde_json::to_string(&cache.get_items(None, None).await).unwrap();
            let stats = serde_json::to_string(&cache.get_stats().await).unwrap();

            seed_item(store.inner(), "g5", "brand-sony", "cat-camera", "FX6").await;
            store.fail(failure);
            assert!(cache.warm_from_db(&store).await.is_err(), "{failure:?} should fail the warm");

            assert_eq!(serde_json::to_string(&cache.get_categories().await).unwrap(), categories);
            assert_eq!(serde_json::to_string(&cache.get_items(None, None).await).unwrap(), items);
            assert_eq!(serde_json::to_string(&cache.get_stats().await).unwrap(), stats);
        }
    }

    #[tokio::test]
    async fn test_spec_failure_does_not_fail_warm() {
        for failure in [Failure::SpecRows, Failure::CategorySlugs] {
            let dir = tempfile::tempdir().unwrap();
            let store = FailingStore::new(seed().await, failure);
            let cache = cache_in(&dir);

            cache.warm_from_db(&store).await.unwrap();

            let stats = cache.get_stats().await;
            assert!(stats.loaded, "{failure:?}");
            assert_eq!(stats.items_count, 4, "{failure:?}");
            assert_eq!(stats.specs_count, 0, "{failure:?}");
            assert_eq!(cache.get_item("g3").await.unwrap().name, "Alexa Mini LF");
            assert!(cache.get_specs("g3").await.is_none());
        }
    }

    #[tokio::test]
    async fn test_rewarm_advances_timestamp_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed().await;
        let cache = cache_in(&dir);

        cache.warm_from_db(&db).await.unwrap();
        let first = cache.get_stats().await;

        seed_item(&db, "g5", "brand-sony", "cat-camera", "FX6").await;
        cache.warm_from_db(&db).await.unwrap();
        let second = cache.get_stats().await;

        assert!(second.last_update.unwrap() > first.last_update.unwrap());
        assert_eq!(second.items_count, 5);
        assert_eq!(second.brands_count, 3);
        assert_eq!(cache.get_brands(Some("cat-camera")).await.len(), 2);
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed().await;
        let warmed = cache_in(&dir);
        warmed.warm_from_db(&db).await.unwrap();

        let restored = cache_in(&dir);
        restored.load().await;

        assert_eq!(restored.get_categories().await, warmed.get_categories().await);
        assert_eq!(restored.get_items(None, None).await, warmed.get_items(None, None).await);
        for id in ["g1", "g2", "g3", "g4"] {
            assert_eq!(restored.get_specs(id).await, warmed.get_specs(id).await);
        }
        assert_eq!(restored.get_brands(None).await, warmed.get_brands(None).await);
        assert_eq!(restored.get_brand_by_id("brand-zeiss").await.unwrap().name, "Zeiss");
        assert_eq!(restored.get_stats().await.brands_count, 3);
        assert_eq!(restored.get_stats().await.last_update, warmed.get_stats().await.last_update);
    }

    #[tokio::test]
    async fn test_concurrent_warms_both_complete() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed().await;
        let cache = Arc::new(cache_in(&dir));

        let (a, b) = tokio::join!(cache.warm_from_db(&db), cache.warm_from_db(&db));
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(cache.get_stats().await.items_count, 4);
    }

    #[test]
    fn test_next_stamp_strictly_increases() {
        let future = Utc::now() + chrono::Duration::hours(1);
        assert!(next_stamp(Some(future)) > future);
        let past = Utc::now() - chrono::Duration::hours(1);
        assert!(next_stamp(Some(past)) > past);
    }

    #[test]
    fn test_staleness() {
        let now = Utc::now();
        let bound = Duration::from_secs(3600);
        assert!(is_stale(None, now, bound));
        assert!(!is_stale(Some(now - chrono::Duration::minutes(30)), now, bound));
        assert!(is_stale(Some(now - chrono::Duration::minutes(61)), now, bound));
        assert!(!is_stale(Some(now + chrono::Duration::minutes(5)), now, bound));
    }
}
