//! Catalog cache and spec resolution for reelgear.
//!
//! - [`SpecsResolver`] turns catalog items into normalized specs using the
//!   static registry in `reelgear_core::specs`
//! - [`CatalogCache`] keeps an in-memory [`Snapshot`] of the whole catalog,
//!   persisted to disk between runs
//! - [`refresh`] rewarms the cache daily or on demand

pub mod cache;
pub mod persist;
pub mod refresh;
pub mod resolver;
pub mod snapshot;

#[cfg(test)]
mod testing;

pub use cache::{CacheStats, CatalogCache, DEFAULT_MAX_STALENESS};
pub use refresh::{following_refresh, next_refresh, refresh_now, spawn_daily_refresh};
pub use resolver::{SpecsById, SpecsResolver};
pub use snapshot::Snapshot;
