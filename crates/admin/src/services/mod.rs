//! Business logic services for admin.
//!
//! # Services
//!
//! - `stats` - TTL-cached dashboard statistics with invalidation and
//!   background re-warm

pub mod stats;

pub use stats::{StatsCache, StatsLoader, StatusCount, StoreStats};
