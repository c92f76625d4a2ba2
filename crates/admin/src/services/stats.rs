//! Cached dashboard statistics.
//!
//! The aggregate is expensive to compute, so it is held in a single-entry
//! `moka` cache with a short TTL. Writes that change the numbers call
//! [`StatsCache::invalidate_and_maybe_warm`]; the next read recomputes, or a
//! background task does it first when background warming is enabled.
//!
//! Concurrent misses are not coalesced: two readers racing past an expired
//! entry may both recompute, and the last insert wins. A load that was
//! already running when [`StatsCache::invalidate`] ran still returns its
//! result to its caller but never stores it.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use distrimart_core::OrderStatus;
use distrimart_storefront::db::RepositoryError;

/// Order count for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Store-wide aggregate shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub distributors: i64,
    pub active_products: i64,
    /// One entry per [`OrderStatus`], zero counts included.
    pub orders_by_status: Vec<StatusCount>,
    /// Sum of subtotals over orders that count as revenue.
    pub revenue: Decimal,
    pub pending_quotes: i64,
    pub computed_at: DateTime<Utc>,
}

/// Computes a fresh [`StoreStats`].
pub trait StatsLoader: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = Result<StoreStats, RepositoryError>> + Send;
}

/// Single-slot TTL cache over a [`StatsLoader`].
///
/// Clones share the same slot.
pub struct StatsCache<L> {
    inner: Arc<StatsCacheInner<L>>,
}

struct StatsCacheInner<L> {
    cache: Cache<(), Arc<StoreStats>>,
    loader: L,
    background_warm: bool,
    /// Bumped by every invalidation.
    generation: AtomicU64,
}

impl<L> Clone for StatsCache<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: StatsLoader> StatsCache<L> {
    /// Create an empty cache.
    #[must_use]
    pub fn new(loader: L, ttl: Duration, background_warm: bool) -> Self {
        let cache = Cache::builder().time_to_live(ttl).build();

        Self {
            inner: Arc::new(StatsCacheInner {
                cache,
                loader,
                background_warm,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// The cached aggregate, recomputing it if missing or expired.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when a recompute fails.
    pub async fn get(&self) -> Result<Arc<StoreStats>, RepositoryError> {
        if let Some(stats) = self.inner.cache.get(&()).await {
            debug!("Stats cache hit");
            return Ok(stats);
        }
        self.warm().await
    }

    /// Recompute and store the aggregate.
    ///
    /// The result is not stored if the cache was invalidated while loading.
    ///
    /// # Errors
    ///
    /// Returns the loader's error; the previous entry, if any, is kept.
    #[instrument(skip(self))]
    pub async fn warm(&self) -> Result<Arc<StoreStats>, RepositoryError> {
        let generation = self.inner.generation.load(Ordering::Acquire);
        match self.inner.loader.load().await {
            Ok(stats) => {
                let stats = Arc::new(stats);
                if self.inner.generation.load(Ordering::Acquire) == generation {
                    self.inner.cache.insert((), Arc::clone(&stats)).await;
                } else {
                    debug!("Stats invalidated during load, not caching");
                }
                Ok(stats)
            }
            Err(e) => {
                error!(error = %e, "Failed to compute store statistics");
                Err(e)
            }
        }
    }

    /// Drop the cached aggregate.
    pub async fn invalidate(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.cache.invalidate(&()).await;
    }

    /// Start a detached recompute when background warming is enabled.
    ///
    /// Returns the task handle, or `None` when disabled. Failures are logged
    /// and never reach the caller.
    pub fn maybe_warm(&self) -> Option<tokio::task::JoinHandle<()>> {
        if !self.inner.background_warm {
            return None;
        }

        let this = self.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = this.warm().await {
                warn!(error = %e, "Background stats warm failed");
            }
        }))
    }

    /// Invalidate after a write, then optionally re-warm in the background.
    pub async fn invalidate_and_maybe_warm(&self) {
        self.invalidate().await;
        self.maybe_warm();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    use tokio::sync::{Notify, Semaphore};

    use super::*;

    /// Counts loads; each result carries the load number in `distributors`.
    #[derive(Default)]
    struct CountingLoader {
        loads: AtomicUsize,
        fail: AtomicBool,
    }

    impl StatsLoader for Arc<CountingLoader> {
        async fn load(&self) -> Result<StoreStats, RepositoryError> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(RepositoryError::DataCorruption("loader down".to_owned()));
            }
            Ok(StoreStats {
                distributors: i64::try_from(n).unwrap(),
                active_products: 0,
                orders_by_status: Vec::new(),
                revenue: Decimal::ZERO,
                pending_quotes: 0,
                computed_at: Utc::now(),
            })
        }
    }

    fn cache(ttl: Duration, background_warm: bool) -> (StatsCache<Arc<CountingLoader>>, Arc<CountingLoader>) {
        let loader = Arc::new(CountingLoader::default());
        (StatsCache::new(Arc::clone(&loader), ttl, background_warm), loader)
    }

    #[tokio::test]
    async fn test_get_within_ttl_returns_same_arc() {
        let (cache, loader) = cache(Duration::from_secs(60), false);

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_causes_exactly_one_recompute() {
        let (cache, loader) = cache(Duration::from_secs(60), false);

        let before = cache.get().await.unwrap();
        cache.invalidate().await;
        let after = cache.get().await.unwrap();
        let again = cache.get().await.unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(Arc::ptr_eq(&after, &again));
        assert_eq!(after.distributors, 2);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_recomputed() {
        let (cache, loader) = cache(Duration::from_millis(50), false);

        let before = cache.get().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        let after = cache.get().await.unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_warm_failure_is_returned_to_caller() {
        let (cache, loader) = cache(Duration::from_secs(60), false);
        loader.fail.store(true, Ordering::SeqCst);

        assert!(cache.get().await.is_err());
        assert!(cache.warm().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_warm_keeps_previous_value() {
        let (cache, loader) = cache(Duration::from_secs(60), false);

        let good = cache.get().await.unwrap();
        loader.fail.store(true, Ordering::SeqCst);
        assert!(cache.warm().await.is_err());

        assert!(Arc::ptr_eq(&good, &cache.get().await.unwrap()));
    }

    #[tokio::test]
    async fn test_maybe_warm_disabled_does_nothing() {
        let (cache, loader) = cache(Duration::from_secs(60), false);

        assert!(cache.maybe_warm().is_none());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_background_warm_fills_cache() {
        let (cache, loader) = cache(Duration::from_secs(60), true);

        cache.maybe_warm().unwrap().await.unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);

        let stats = cache.get().await.unwrap();
        assert_eq!(stats.distributors, 1);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_background_warm_failure_is_swallowed() {
        let (cache, loader) = cache(Duration::from_secs(60), true);
        loader.fail.store(true, Ordering::SeqCst);

        // The task completes normally even though the load failed.
        cache.maybe_warm().unwrap().await.unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    /// Signals when a load starts, then blocks until released.
    struct GatedLoader {
        started: Notify,
        release: Semaphore,
        loads: AtomicUsize,
    }

    impl GatedLoader {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                started: Notify::new(),
                release: Semaphore::new(0),
                loads: AtomicUsize::new(0),
            })
        }
    }

    impl StatsLoader for Arc<GatedLoader> {
        async fn load(&self) -> Result<StoreStats, RepositoryError> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
            self.started.notify_one();
            self.release.acquire().await.unwrap().forget();
            Ok(StoreStats {
                distributors: i64::try_from(n).unwrap(),
                active_products: 0,
                orders_by_status: Vec::new(),
                revenue: Decimal::ZERO,
                pending_quotes: 0,
                computed_at: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_load_overlapping_invalidate_is_not_cached() {
        let loader = GatedLoader::new();
        let cache = StatsCache::new(Arc::clone(&loader), Duration::from_secs(60), false);

        let stale = tokio::spawn({
            let cache = cache.clone();
            async move { cache.warm().await }
        });
        loader.started.notified().await;
        cache.invalidate().await;
        loader.release.add_permits(1);

        // The in-flight caller still gets its result.
        assert_eq!(stale.await.unwrap().unwrap().distributors, 1);

        loader.release.add_permits(1);
        let fresh = cache.get().await.unwrap();
        assert_eq!(fresh.distributors, 2);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }
}
