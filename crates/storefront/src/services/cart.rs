//! Cart engine.
//!
//! Every mutation runs in one `BEGIN IMMEDIATE` transaction, so the stock
//! check and the write it guards see the same stock level.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use corner_shop_core::{
    CartLineId, CustomerId, GuestToken, Identity, Price, PriceError, ProductId, Quantity,
};

use crate::db::{self, CartRepository, ProductRepository, RepositoryError};
use crate::models::cart::{Cart, CartLine, MergeOutcome};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity was zero or negative.
    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(i64),

    /// Product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Line does not exist or belongs to someone else.
    #[error("cart line {0} not found")]
    LineNotFound(CartLineId),

    /// Requested quantity exceeds current stock.
    #[error("insufficient stock for {product_name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        requested: i64,
        available: i64,
    },

    /// The cart total would not fit the storable cents range.
    #[error("cart total out of range: {0}")]
    AmountOutOfRange(#[from] PriceError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

fn positive(quantity: i64) -> Result<Quantity, CartError> {
    Quantity::new(quantity).map_err(|_| CartError::InvalidQuantity(quantity))
}

/// Check that the owner's cart total still fits once the line for
/// `product_id` holds `quantity` units at `unit_price`.
async fn ensure_total_fits(
    cart: &mut CartRepository<'_>,
    owner: Identity,
    product_id: ProductId,
    unit_price: Price,
    quantity: Quantity,
) -> Result<(), CartError> {
    let lines = cart.list(owner).await?;
    let others = lines
        .iter()
        .filter(|line| line.product_id != product_id)
        .map(CartLine::subtotal);
    Price::checked_sum(others.chain(std::iter::once(unit_price.checked_times(quantity))))?;
    Ok(())
}

/// Cart engine service.
pub struct CartService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add units of a product to the owner's cart.
    ///
    /// Creates the line with a name and price snapshot, or sums into the
    /// existing line for the same product (keeping its snapshot).
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity` is not positive.
    /// Returns `CartError::ProductNotFound` if the product doesn't exist.
    /// Returns `CartError::InsufficientStock` if the resulting line quantity
    /// would exceed stock.
    /// Returns `CartError::AmountOutOfRange` if the cart total would no
    /// longer fit in cents.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn add_item(
        &self,
        owner: Identity,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartLine, CartError> {
        let quantity = positive(quantity)?;

        let mut tx = db::begin_write(self.pool).await?;
        let product = ProductRepository::new(&mut tx)
            .get_by_id(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        let mut cart = CartRepository::new(&mut tx);
        let existing = cart.find_for_product(owner, product_id).await?;
        let requested = existing
            .as_ref()
            .map_or(Some(quantity), |line| line.quantity.checked_add(quantity));

        let Some(requested) = requested.filter(|q| q.fits_in(product.stock)) else {
            return Err(CartError::InsufficientStock {
                product_id,
                product_name: product.name,
                requested: existing
                    .map_or(0, |line| line.quantity.get())
                    .saturating_add(quantity.get()),
                available: product.stock,
            });
        };

        let unit_price = existing.as_ref().map_or(product.price, |line| line.unit_price);
        ensure_total_fits(&mut cart, owner, product_id, unit_price, requested).await?;

        let line = match existing {
            Some(mut line) => {
                cart.set_quantity(line.id, requested).await?;
                line.quantity = requested;
                line
            }
            None => cart.insert(owner, &product, requested).await?,
        };
        tx.commit().await?;

        tracing::debug!(line_id = %line.id, quantity = %line.quantity, "cart line saved");
        Ok(line)
    }

    /// Overwrite the quantity of an owned line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity` is not positive.
    /// Returns `CartError::LineNotFound` if the line doesn't exist or is not
    /// owned by `owner`.
    /// Returns `CartError::InsufficientStock` if `quantity` exceeds stock.
    /// Returns `CartError::AmountOutOfRange` if the cart total would no
    /// longer fit in cents.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn update_quantity(
        &self,
        owner: Identity,
        line_id: CartLineId,
        quantity: i64,
    ) -> Result<CartLine, CartError> {
        let quantity = positive(quantity)?;

        let mut tx = db::begin_write(self.pool).await?;
        let mut line = CartRepository::new(&mut tx)
            .get_owned(owner, line_id)
            .await?
            .ok_or(CartError::LineNotFound(line_id))?;

        let available = ProductRepository::new(&mut tx)
            .get_stock(line.product_id)
            .await?
            .unwrap_or(0);
        if !quantity.fits_in(available) {
            return Err(CartError::InsufficientStock {
                product_id: line.product_id,
                product_name: line.product_name,
                requested: quantity.get(),
                available,
            });
        }

        let mut cart = CartRepository::new(&mut tx);
        ensure_total_fits(&mut cart, owner, line.product_id, line.unit_price, quantity).await?;
        cart.set_quantity(line.id, quantity).await?;
        tx.commit().await?;

        line.quantity = quantity;
        Ok(line)
    }

    /// Remove an owned line.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was removed, `false` if there was nothing to
    /// remove (missing or not owned).
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database operation fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn remove_item(&self, owner: Identity, line_id: CartLineId) -> Result<bool, CartError> {
        let mut tx = db::begin_write(self.pool).await?;
        let removed = CartRepository::new(&mut tx)
            .delete_owned(owner, line_id)
            .await?;
        tx.commit().await?;

        Ok(removed)
    }

    /// The owner's cart, most recently added line first.
    ///
    /// # Errors
    ///
    /// Returns `CartError::AmountOutOfRange` if the total does not fit in
    /// cents.
    /// Returns `CartError::Repository` if the database operation fails.
    pub async fn list_cart(&self, owner: Identity) -> Result<Cart, CartError> {
        let mut conn = self.pool.acquire().await?;
        let lines = CartRepository::new(&mut conn).list(owner).await?;
        Ok(Cart::from_lines(lines)?)
    }

    /// Fold a guest's cart into a customer's cart.
    ///
    /// Lines for products the customer doesn't have yet change owner as they
    /// are, without a stock cap; checkout checks stock again. Lines for
    /// products the customer already has are summed into the customer's
    /// line and the guest line is deleted. The sum is capped at current
    /// stock, except that the customer's own quantity is never reduced: if
    /// that line already exceeds stock it keeps its quantity and every guest
    /// unit is dropped. The whole merge commits or nothing does.
    ///
    /// # Errors
    ///
    /// Returns `CartError::AmountOutOfRange` if the merged cart total would
    /// not fit in cents.
    /// Returns `CartError::Repository` if any step fails.
    ///
    /// On error the merge is rolled back.
    #[instrument(skip(self), fields(guest = %guest, customer_id = %customer_id))]
    pub async fn merge_guest_cart(
        &self,
        guest: GuestToken,
        customer_id: CustomerId,
    ) -> Result<MergeOutcome, CartError> {
        let customer = Identity::Customer(customer_id);
        let mut outcome = MergeOutcome::default();

        let mut tx = db::begin_write(self.pool).await?;
        let guest_lines = CartRepository::new(&mut tx)
            .list(Identity::Guest(guest))
            .await?;

        for guest_line in guest_lines {
            let existing = CartRepository::new(&mut tx)
                .find_for_product(customer, guest_line.product_id)
                .await?;

            let Some(existing) = existing else {
                CartRepository::new(&mut tx)
                    .reassign_to_customer(guest_line.id, customer_id)
                    .await?;
                outcome.moved += 1;
                continue;
            };

            let stock = ProductRepository::new(&mut tx)
                .get_stock(guest_line.product_id)
                .await?
                .unwrap_or(0);
            let combined = existing
                .quantity
                .get()
                .saturating_add(guest_line.quantity.get());
            let merged = combined.min(stock.max(existing.quantity.get()));
            let merged = Quantity::new(merged).map_err(|e| {
                RepositoryError::DataCorruption(format!("merged quantity: {e}"))
            })?;

            let mut cart = CartRepository::new(&mut tx);
            cart.set_quantity(existing.id, merged).await?;
            cart.delete(guest_line.id).await?;

            outcome.combined += 1;
            outcome.units_dropped += combined - merged.get();
        }

        let merged_lines = CartRepository::new(&mut tx).list(customer).await?;
        Price::checked_sum(merged_lines.iter().map(CartLine::subtotal))?;
        tx.commit().await?;

        if outcome.units_dropped > 0 {
            tracing::info!(
                units_dropped = outcome.units_dropped,
                "merged cart capped at available stock"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_rejects_zero_and_negative() {
        assert!(matches!(positive(0), Err(CartError::InvalidQuantity(0))));
        assert!(matches!(positive(-3), Err(CartError::InvalidQuantity(-3))));
        assert!(positive(1).is_ok());
    }

    #[test]
    fn test_insufficient_stock_message_names_product() {
        let err = CartError::InsufficientStock {
            product_id: ProductId::new(7),
            product_name: "Webcam".to_owned(),
            requested: 11,
            available: 9,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Webcam: requested 11, available 9"
        );
    }
}
