//! Database operations for the `commerce` schema.
//!
//! The storefront owns the schema and its migrations; the admin binary reuses
//! these repositories through the library crate.
//!
//! ## Tables
//!
//! - `distributor`, `distributor_domain` - Tenants and their custom domains
//! - `category`, `product` - Catalog
//! - `distributor_price`, `category_discount` - Per-tenant pricing rules
//! - `customer_order`, `order_item`, `order_status_history` - Orders and audit trail
//! - `quote_request`, `quote_item` - Quote requests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p distrimart-cli -- migrate
//! ```

pub mod catalog;
pub mod distributors;
pub mod orders;
pub mod quotes;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::{CatalogRepository, PgPricingSource};
pub use distributors::PgTenantDirectory;
pub use orders::{OrderRepository, insert_order};
pub use quotes::QuoteRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint or state violation (duplicate domain, illegal status change).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique-constraint violations to `Conflict`, everything else to `Database`.
    #[must_use]
    pub fn from_unique(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }
}

/// Convert a stored quantity to the unsigned domain type.
pub fn quantity_from_db(value: i32) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative quantity {value}")))
}

/// Convert a domain quantity for storage.
pub fn quantity_to_db(value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::Conflict(format!("quantity {value} is too large")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
