//! Distrimart storefront library.
//!
//! The public JSON API: tenant-aware catalog, cart pricing, checkout and
//! quote requests. The schema, repositories and pricing source are shared
//! with the admin binary through this crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
