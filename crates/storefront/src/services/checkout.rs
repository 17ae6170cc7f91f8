//! Order engine: turns a customer's cart into an order.
//!
//! A checkout validates the cart and writes the order, its lines, the stock
//! decrements, the payment intent and the cart deletion inside one
//! `BEGIN IMMEDIATE` transaction. Dropping the transaction on any error rolls
//! all of it back.

use core::fmt;

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use thiserror::Error;
use tracing::{Span, instrument};

use corner_shop_core::{CustomerId, Identity, OrderId, PaymentMethod, Price, PriceError, ProductId};

use crate::db::{
    self, CartRepository, CustomerRepository, OrderRepository, ProductRepository, RepositoryError,
};
use crate::models::cart::{Cart, CartLine};
use crate::models::order::CheckoutSummary;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The customer's cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A line asks for more units than are in stock.
    #[error("insufficient stock for {product_name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        requested: i64,
        available: i64,
    },

    /// Customer does not exist.
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    /// The order total would not fit the storable cents range.
    #[error("order total out of range: {0}")]
    AmountOutOfRange(#[from] PriceError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Progress of one checkout attempt, recorded on the tracing span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    Started,
    /// Cart is non-empty and every line fits current stock.
    Validated,
    /// Validation failed; nothing was written.
    Rejected,
    Committed,
    /// A write failed after validation; the transaction was rolled back.
    Aborted,
}

impl CheckoutStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter_stage(stage: CheckoutStage) {
    Span::current().record("stage", stage.as_str());
}

/// Order engine service.
pub struct CheckoutService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Place an order for everything in the customer's cart.
    ///
    /// Each order line copies the quantity and the unit price snapshot of its
    /// cart line. The payment intent is recorded as `awaiting` for the full
    /// total and the cart is emptied.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    /// Returns `CheckoutError::InsufficientStock` naming the first line that
    /// no longer fits current stock.
    /// Returns `CheckoutError::AmountOutOfRange` if the total does not fit in
    /// cents.
    /// Returns `CheckoutError::Repository` if any write fails.
    ///
    /// On error no order, payment, stock or cart change is persisted.
    #[instrument(
        skip(self, method),
        fields(payment_method = %method, stage = tracing::field::Empty, order_id = tracing::field::Empty)
    )]
    pub async fn checkout(
        &self,
        customer_id: CustomerId,
        method: &PaymentMethod,
    ) -> Result<OrderId, CheckoutError> {
        enter_stage(CheckoutStage::Started);

        let mut tx = db::begin_write(self.pool).await?;

        let lines = match validate_cart(&mut tx, customer_id).await {
            Ok(lines) => lines,
            Err(err) => {
                enter_stage(CheckoutStage::Rejected);
                tracing::info!(error = %err, "checkout rejected");
                return Err(err);
            }
        };
        enter_stage(CheckoutStage::Validated);

        match commit_order(tx, customer_id, &lines, method).await {
            Ok(order_id) => {
                enter_stage(CheckoutStage::Committed);
                Span::current().record("order_id", order_id.as_i64());
                tracing::info!(%order_id, lines = lines.len(), "order placed");
                Ok(order_id)
            }
            Err(err) => {
                enter_stage(CheckoutStage::Aborted);
                tracing::warn!(error = %err, "checkout aborted");
                Err(err)
            }
        }
    }

    /// The customer's contact details and cart, as reviewed before checkout.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::CustomerNotFound` if the customer doesn't exist.
    /// Returns `CheckoutError::Repository` if the database operation fails.
    pub async fn summary(&self, customer_id: CustomerId) -> Result<CheckoutSummary, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        let customer = CustomerRepository::new(&mut tx)
            .get_by_id(customer_id)
            .await?
            .ok_or(CheckoutError::CustomerNotFound(customer_id))?;
        let lines = CartRepository::new(&mut tx)
            .list(Identity::Customer(customer_id))
            .await?;
        tx.commit().await?;

        Ok(CheckoutSummary {
            customer,
            cart: Cart::from_lines(lines)?,
        })
    }
}

/// Load the customer's cart and check every line against current stock.
async fn validate_cart(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
) -> Result<Vec<CartLine>, CheckoutError> {
    let lines = CartRepository::new(conn)
        .list(Identity::Customer(customer_id))
        .await?;
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    for line in &lines {
        let available = ProductRepository::new(conn)
            .get_stock(line.product_id)
            .await?
            .unwrap_or(0);
        if !line.quantity.fits_in(available) {
            return Err(insufficient(line, available));
        }
    }

    Ok(lines)
}

/// Write the order and everything that goes with it, then commit.
async fn commit_order(
    mut tx: Transaction<'static, Sqlite>,
    customer_id: CustomerId,
    lines: &[CartLine],
    method: &PaymentMethod,
) -> Result<OrderId, CheckoutError> {
    let total = Price::checked_sum(lines.iter().map(CartLine::subtotal))?;

    let order = OrderRepository::new(&mut tx).insert_order(customer_id).await?;

    for line in lines {
        OrderRepository::new(&mut tx)
            .insert_line(order.id, line.product_id, line.quantity, line.unit_price)
            .await?;

        let decremented = ProductRepository::new(&mut tx)
            .try_decrement_stock(line.product_id, line.quantity)
            .await?;
        if !decremented {
            let available = ProductRepository::new(&mut tx)
                .get_stock(line.product_id)
                .await?
                .unwrap_or(0);
            return Err(insufficient(line, available));
        }
    }

    OrderRepository::new(&mut tx)
        .insert_payment(order.id, method, total)
        .await?;
    CartRepository::new(&mut tx)
        .delete_all_for_customer(customer_id)
        .await?;

    tx.commit().await?;
    Ok(order.id)
}

fn insufficient(line: &CartLine, available: i64) -> CheckoutError {
    CheckoutError::InsufficientStock {
        product_id: line.product_id,
        product_name: line.product_name.clone(),
        requested: line.quantity.get(),
        available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(CheckoutStage::Started.to_string(), "started");
        assert_eq!(CheckoutStage::Rejected.as_str(), "rejected");
        assert_eq!(CheckoutStage::Committed.as_str(), "committed");
    }

    #[test]
    fn test_empty_cart_message() {
        assert_eq!(CheckoutError::EmptyCart.to_string(), "cart is empty");
    }
}
