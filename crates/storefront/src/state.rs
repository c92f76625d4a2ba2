//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use distrimart_core::tenant::TenantResolver;

use crate::config::StorefrontConfig;
use crate::db::{PgPricingSource, PgTenantDirectory};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    tenants: TenantResolver<PgTenantDirectory>,
    pricing: PgPricingSource,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let tenants = TenantResolver::new(PgTenantDirectory::new(pool.clone()), config.dev_suffix.clone());
        let pricing = PgPricingSource::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tenants,
                pricing,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Host-to-tenant resolver.
    #[must_use]
    pub fn tenants(&self) -> &TenantResolver<PgTenantDirectory> {
        &self.inner.tenants
    }

    /// Pricing rules backed by the database.
    #[must_use]
    pub fn pricing(&self) -> &PgPricingSource {
        &self.inner.pricing
    }
}
