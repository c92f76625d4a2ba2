//! Distrimart admin library.
//!
//! Back-office API for distributors, pricing rules, orders and quotes, plus
//! cached dashboard statistics.
//!
//! # Security
//!
//! The admin API writes pricing and order state and has no login of its own.
//! Bind it to loopback or a private network only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
