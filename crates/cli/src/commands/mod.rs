//! Command implementations.

pub mod catalog;
pub mod customer;
pub mod migrate;
pub mod seed;

use thiserror::Error;

use corner_shop_storefront::config::ConfigError;
use corner_shop_storefront::{AppError, StartupError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store could not be opened or migrated.
    #[error("{0}")]
    Startup(#[from] StartupError),

    /// A store operation failed.
    #[error("{0}")]
    Store(#[from] AppError),
}
