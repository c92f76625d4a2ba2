//! Database operations for the admin API.
//!
//! The schema lives in the storefront crate; order and quote repositories are
//! shared from there. This module adds the admin-only writes (distributors,
//! domains, pricing rules) and the statistics query.

pub mod distributors;
pub mod pricing;
pub mod stats;

pub use distrimart_storefront::db::{
    OrderRepository, PgPricingSource, QuoteRepository, RepositoryError, create_pool,
};

pub use distributors::DistributorRepository;
pub use pricing::PricingRuleRepository;
pub use stats::PgStatsLoader;
