//! Seed the store with the default catalog.

use corner_shop_storefront::{AppError, Storefront};

/// Insert the default catalog into an empty store.
///
/// # Errors
///
/// Returns `AppError::StoreUnavailable` if the schema is missing or an insert
/// fails.
pub async fn run(store: &Storefront) -> Result<(), AppError> {
    let inserted = store.seed_catalog().await?;
    if inserted == 0 {
        tracing::info!("Products already present; nothing seeded");
    } else {
        tracing::info!(inserted, "Seeded default catalog");
    }
    Ok(())
}
