//! Order, order line and payment repository.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use corner_shop_core::{
    CustomerId, OrderId, OrderStatus, PaymentId, PaymentMethod, PaymentStatus, Price, ProductId,
    Quantity,
};

use super::RepositoryError;
use crate::models::order::{Order, OrderLine, Payment};

/// Internal row type for order header queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: CustomerId,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            customer_id: row.customer_id,
            status,
            created_at: row.created_at,
        })
    }
}

/// Order header joined with the owning customer's name.
#[derive(Debug, sqlx::FromRow)]
struct OrderWithCustomerRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_name: String,
}

/// Internal row type for order line queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    product_id: ProductId,
    product_name: String,
    quantity: i64,
    unit_price_cents: i64,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("order line for {}: {e}", row.product_id))
        })?;
        let unit_price = Price::from_cents(row.unit_price_cents).map_err(|e| {
            RepositoryError::DataCorruption(format!("order line for {}: {e}", row.product_id))
        })?;

        Ok(Self {
            product_id: row.product_id,
            product_name: row.product_name,
            quantity,
            unit_price,
        })
    }
}

/// Internal row type for payment queries.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: PaymentId,
    order_id: OrderId,
    method: String,
    amount_cents: i64,
    status: String,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = RepositoryError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let corrupt = |e: String| RepositoryError::DataCorruption(format!("payment {}: {e}", row.id));

        let method = PaymentMethod::parse(&row.method).map_err(|e| corrupt(e.to_string()))?;
        let amount = Price::from_cents(row.amount_cents).map_err(|e| corrupt(e.to_string()))?;
        let status = row.status.parse::<PaymentStatus>().map_err(corrupt)?;

        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            method,
            amount,
            status,
        })
    }
}

fn cents(price: Price) -> Result<i64, RepositoryError> {
    price
        .to_cents()
        .map_err(|e| RepositoryError::DataCorruption(format!("amount: {e}")))
}

/// Repository for order database operations.
pub struct OrderRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> OrderRepository<'c> {
    /// Create a new order repository on a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Insert a `pending` order header.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_order(&mut self, customer_id: CustomerId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (customer_id, status, created_at)
            VALUES (?, ?, ?)
            RETURNING id, customer_id, status, created_at
            ",
        )
        .bind(customer_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await?;

        Order::try_from(row)
    }

    /// Insert one order line with its captured unit price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the price cannot be stored.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_line(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: Quantity,
        unit_price: Price,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO order_lines (order_id, product_id, quantity, unit_price_cents)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity.get())
        .bind(cents(unit_price)?)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Record the payment intent for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order already has a payment.
    /// Returns `RepositoryError::DataCorruption` if the amount cannot be stored.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_payment(
        &mut self,
        order_id: OrderId,
        method: &PaymentMethod,
        amount: Price,
    ) -> Result<Payment, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r"
            INSERT INTO payments (order_id, method, amount_cents, status)
            VALUES (?, ?, ?, ?)
            RETURNING id, order_id, method, amount_cents, status
            ",
        )
        .bind(order_id)
        .bind(method.as_str())
        .bind(cents(amount)?)
        .bind(PaymentStatus::Awaiting.as_str())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "order already has a payment"))?;

        Payment::try_from(row)
    }

    /// An order header and its customer's name, only if the order belongs to
    /// `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored status is invalid.
    pub async fn get_for_customer(
        &mut self,
        order_id: OrderId,
        customer_id: CustomerId,
    ) -> Result<Option<(Order, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderWithCustomerRow>(
            r"
            SELECT o.id, o.customer_id, o.status, o.created_at, c.name AS customer_name
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.id = ? AND o.customer_id = ?
            ",
        )
        .bind(order_id)
        .bind(customer_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(|r| Ok((Order::try_from(r.order)?, r.customer_name)))
            .transpose()
    }

    /// Lines of an order in insertion order, joined with product names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored line is invalid.
    pub async fn lines(&mut self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT ol.product_id, p.name AS product_name, ol.quantity, ol.unit_price_cents
            FROM order_lines ol
            JOIN products p ON p.id = ol.product_id
            WHERE ol.order_id = ?
            ORDER BY ol.id ASC
            ",
        )
        .bind(order_id)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(OrderLine::try_from).collect()
    }

    /// The payment recorded for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored payment is invalid.
    pub async fn payment(&mut self, order_id: OrderId) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r"
            SELECT id, order_id, method, amount_cents, status
            FROM payments
            WHERE order_id = ?
            ",
        )
        .bind(order_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Payment::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_is_corrupt() {
        let row = OrderRow {
            id: OrderId::new(1),
            customer_id: CustomerId::new(1),
            status: "lost".to_owned(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            Order::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_payment_row_converts() {
        let row = PaymentRow {
            id: PaymentId::new(3),
            order_id: OrderId::new(2),
            method: "pix".to_owned(),
            amount_cents: 12_345,
            status: "awaiting".to_owned(),
        };
        let payment = Payment::try_from(row).expect("valid payment row");
        assert_eq!(payment.amount.to_cents().expect("cents"), 12_345);
        assert_eq!(payment.status, PaymentStatus::Awaiting);
    }
}
