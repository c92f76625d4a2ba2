//! Distrimart Core - Domain types and tenant-aware pricing rules.
//!
//! This crate is shared by every Distrimart component:
//! - `storefront` - Public JSON API, resolves tenants and prices products
//! - `admin` - Internal API for distributors, pricing rules, orders and quotes
//! - `cli` - Migrations and seeding
//!
//! # Architecture
//!
//! The core crate holds types, traits and pure logic only. Persistence lives
//! behind the [`tenant::TenantDirectory`] and [`pricing::PricingSource`]
//! traits, which the binaries implement over `PostgreSQL`.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, discount percents and status enums
//! - [`tenant`] - Host normalization and tenant resolution
//! - [`pricing`] - Tier schedules and effective price resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod tenant;
pub mod types;

pub use types::*;
