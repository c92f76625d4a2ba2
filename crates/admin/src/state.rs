//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::{PgPricingSource, PgStatsLoader};
use crate::services::StatsCache;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    stats: StatsCache<PgStatsLoader>,
    pricing: PgPricingSource,
}

impl AppState {
    /// Create a new application state with an empty statistics cache.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let stats = StatsCache::new(
            PgStatsLoader::new(pool.clone()),
            config.stats.ttl,
            config.stats.background_warm,
        );
        let pricing = PgPricingSource::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stats,
                pricing,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Cached dashboard statistics.
    #[must_use]
    pub fn stats(&self) -> &StatsCache<PgStatsLoader> {
        &self.inner.stats
    }

    /// Pricing rules, used when converting quotes.
    #[must_use]
    pub fn pricing(&self) -> &PgPricingSource {
        &self.inner.pricing
    }
}
