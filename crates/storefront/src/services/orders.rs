//! Order query: read-only views of committed orders.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use corner_shop_core::{CustomerId, OrderId};

use crate::db::{OrderRepository, RepositoryError};
use crate::models::order::OrderView;

/// Errors that can occur when reading orders.
#[derive(Debug, Error)]
pub enum OrderQueryError {
    /// Order does not exist or belongs to another customer.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderQueryError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Order query service.
pub struct OrderQueryService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderQueryService<'a> {
    /// Create a new order query service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// One of the customer's orders with its lines, payment and total.
    ///
    /// Header, lines and payment are read in one transaction so they come
    /// from the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns `OrderQueryError::NotFound` if the order doesn't exist or is
    /// owned by a different customer.
    /// Returns `OrderQueryError::Repository` with `DataCorruption` if the
    /// order has no payment.
    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        customer_id: CustomerId,
        order_id: OrderId,
    ) -> Result<OrderView, OrderQueryError> {
        let mut tx = self.pool.begin().await?;
        let mut orders = OrderRepository::new(&mut tx);

        let (order, customer_name) = orders
            .get_for_customer(order_id, customer_id)
            .await?
            .ok_or(OrderQueryError::NotFound(order_id))?;
        let lines = orders.lines(order_id).await?;
        let payment = orders.payment(order_id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("order {order_id} has no payment"))
        })?;
        tx.commit().await?;

        let view = OrderView::new(order, customer_name, lines, payment).map_err(|e| {
            RepositoryError::DataCorruption(format!("order {order_id} total: {e}"))
        })?;
        if !view.payment_matches_total() {
            tracing::warn!(
                payment_amount = %view.payment.amount,
                total = %view.total,
                "payment amount differs from order total"
            );
        }
        Ok(view)
    }
}
