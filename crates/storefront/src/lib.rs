//! Corner Shop storefront core.
//!
//! Carts, checkout and order views over a `SQLite` store. The transport
//! layer (HTTP, sessions, templates) lives outside this crate and talks to
//! the [`Storefront`] facade.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod seed;
pub mod services;
pub mod state;

pub use config::StoreConfig;
pub use error::AppError;
pub use state::{StartupError, Storefront};
