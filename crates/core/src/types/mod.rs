//! Core types for Distrimart.
//!
//! Type-safe wrappers for the domain concepts shared by every crate.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{
    DiscountPercent, MAX_MONEY, MONEY_SCALE, MoneyError, PercentError, check_money, line_total,
    round_money,
};
pub use status::*;
