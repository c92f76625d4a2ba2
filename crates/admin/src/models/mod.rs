//! Request and response shapes specific to the admin API.

pub mod distributor;
pub mod pricing;

pub use distributor::{DistributorDetail, DistributorPatch, NewDistributor};
pub use pricing::{CategoryDiscount, PriceRule};
