//! Scheduled and on-demand cache refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDateTime, NaiveTime, TimeZone};
use reelgear_core::{CatalogStore, Error};
use tokio::task::JoinHandle;

use crate::cache::{CacheStats, CatalogCache};

/// The first `hour:00:00` strictly after `now`.
pub fn next_refresh(now: NaiveDateTime, hour: u32) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        now.date()
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(at))
            .unwrap_or(today)
    }
}

/// The run after the one scheduled for `previous`.
///
/// Always at least a day past `previous`, even if the wall clock reads
/// slightly earlier than `previous` on wake-up.
pub fn following_refresh(previous: NaiveDateTime, now: NaiveDateTime, hour: u32) -> NaiveDateTime {
    next_refresh(previous.max(now), hour)
}

/// Rewarm `cache` from `store` and return the resulting stats.
///
/// # Errors
///
/// Propagates the warm failure; the cache keeps its previous snapshot.
pub async fn refresh_now<S: CatalogStore + ?Sized>(cache: &CatalogCache, store: &S) -> Result<CacheStats, Error> {
    cache.warm_from_db(store).await?;
    Ok(cache.get_stats().await)
}

fn until(next: NaiveDateTime) -> Duration {
    let now = Local::now();
    // DST gaps have no local mapping; fall back to the naive delta.
    Local
        .from_local_datetime(&next)
        .earliest()
        .map(|at| at.signed_duration_since(now))
        .unwrap_or_else(|| next.signed_duration_since(now.naive_local()))
        .to_std()
        .unwrap_or_default()
}

/// Rewarm `cache` every day at `hour` local time.
///
/// A failed warm is logged and the loop waits for the next day.
pub fn spawn_daily_refresh<S>(cache: Arc<CatalogCache>, store: Arc<S>, hour: u32) -> JoinHandle<()>
where
    S: CatalogStore + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut next = next_refresh(Local::now().naive_local(), hour);
        loop {
            let wait = until(next);
            tracing::info!(next = %next, wait_secs = wait.as_secs(), "scheduled catalog refresh");
            tokio::time::sleep(wait).await;

            match refresh_now(&cache, store.as_ref()).await {
                Ok(stats) => tracing::info!(
                    items = stats.items_count,
                    specs = stats.specs_count,
                    "daily catalog refresh complete"
                ),
                Err(e) => tracing::error!(error = %e, "daily catalog refresh failed; keeping previous snapshot"),
            }

            next = following_refresh(next, Local::now().naive_local(), hour);
        }
    })
}
