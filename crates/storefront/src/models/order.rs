//! Order, payment and order view types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use corner_shop_core::{
    CustomerId, OrderId, OrderStatus, PaymentId, PaymentMethod, PaymentStatus, Price, PriceError,
    ProductId, Quantity,
};

use super::cart::Cart;
use super::customer::Customer;

/// Order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A line of a committed order, joined with the product's current name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: Quantity,
    /// Price captured at checkout.
    pub unit_price: Price,
}

impl OrderLine {
    /// Quantity × captured unit price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if the subtotal cannot be stored as
    /// cents.
    pub fn subtotal(&self) -> Result<Price, PriceError> {
        self.unit_price.checked_times(self.quantity)
    }
}

/// The payment intent recorded for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub method: PaymentMethod,
    pub amount: Price,
    pub status: PaymentStatus,
}

/// Everything needed to display one order to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub order: Order,
    pub customer_name: String,
    pub lines: Vec<OrderLine>,
    pub payment: Payment,
    /// Sum of line subtotals, recomputed on read.
    pub total: Price,
}

impl OrderView {
    /// Assemble a view, recomputing the total from the lines.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if the recomputed total cannot be
    /// stored as cents.
    pub fn new(
        order: Order,
        customer_name: String,
        lines: Vec<OrderLine>,
        payment: Payment,
    ) -> Result<Self, PriceError> {
        let total = Price::checked_sum(lines.iter().map(OrderLine::subtotal))?;
        Ok(Self {
            order,
            customer_name,
            lines,
            payment,
            total,
        })
    }

    /// Whether the recorded payment amount matches the recomputed total.
    #[must_use]
    pub fn payment_matches_total(&self) -> bool {
        self.payment.amount == self.total
    }
}

/// What the customer reviews before placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub customer: Customer,
    pub cart: Cart,
}
