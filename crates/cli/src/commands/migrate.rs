//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cs-cli migrate
//! ```
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded in the
//! binary, so the command needs no files at runtime.

use corner_shop_storefront::{StartupError, Storefront};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `StartupError::Migrate` if a migration fails.
pub async fn run(store: &Storefront) -> Result<(), StartupError> {
    tracing::info!("Running migrations...");
    store.migrate().await?;
    tracing::info!("Migrations complete!");
    Ok(())
}
