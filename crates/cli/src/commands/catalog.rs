//! Catalog listing command.

use corner_shop_storefront::{AppError, Storefront};

/// Print the catalog, one product per line.
///
/// # Errors
///
/// Returns `AppError::StoreUnavailable` if the catalog cannot be read.
pub async fn list(store: &Storefront, in_stock_only: bool) -> Result<(), AppError> {
    let products = store.list_products(in_stock_only).await?;

    #[allow(clippy::print_stdout)]
    {
        for product in &products {
            println!(
                "{:>4}  {:<40} {:>10}  stock {:>3}",
                product.id,
                product.name,
                product.price.to_string(),
                product.stock
            );
        }
        println!("{} product(s)", products.len());
    }

    Ok(())
}
