//! Customer management commands.

use corner_shop_core::CustomerId;
use corner_shop_storefront::{AppError, Storefront};

/// Register a customer through the same validation path as the storefront.
///
/// # Errors
///
/// Returns `AppError::InvalidInput` for a blank name, malformed email or
/// short password, and `AppError::DuplicateEmail` if the email is taken.
pub async fn register(
    store: &Storefront,
    name: &str,
    email: &str,
    password: &str,
    phone: &str,
) -> Result<CustomerId, AppError> {
    let customer_id = store
        .register_customer(name, email, password, phone)
        .await?;
    tracing::info!(%customer_id, email, "Customer registered");
    Ok(customer_id)
}
