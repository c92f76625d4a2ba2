//! Domain models for the storefront and admin APIs.
//!
//! These are the shapes returned by repositories and serialized to JSON.
//! Pricing and tenant types live in `distrimart-core`.

pub mod catalog;
pub mod distributor;
pub mod order;
pub mod quote;

pub use catalog::{Category, Product};
pub use distributor::{Distributor, DistributorDomain};
pub use order::{NewOrder, Order, OrderDetail, OrderItem, StatusChange};
pub use quote::{NewQuote, Quote, QuoteDetail, QuoteItem, QuotedPrice};
