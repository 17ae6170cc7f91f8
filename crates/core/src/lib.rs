//! Corner Shop Core - Shared types library.
//!
//! This crate provides the domain vocabulary used across the workspace:
//! - `storefront` - Cart, checkout, order and credential services
//! - `cli` - Command-line tools for migrations, seeding and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. The
//! optional `sqlite` feature adds `sqlx` encode/decode support so the
//! storefront can bind and read these types directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, emails,
//!   identities, payment methods and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
