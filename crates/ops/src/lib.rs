//! QuickDrop operations library.
//!
//! CRUD and reporting queries for a grocery-delivery platform stored in
//! MongoDB: order assignment, product discovery, ordering, sales and
//! inventory reports, rating maintenance and archiving. Pipelines run in the
//! database; this crate builds them and shapes the results.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod charts;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod seed;
pub mod services;

pub use config::{ConfigError, OpsConfig};
pub use error::OpsError;
