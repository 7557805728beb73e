//! QuickDrop Core - Shared types library.
//!
//! This crate provides common types used across all QuickDrop components:
//! - `ops` - MongoDB queries, seeding and reporting
//! - `cli` - Command-line front end over the ops crate
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, statuses and
//!   GeoJSON points

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
