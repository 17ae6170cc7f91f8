//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use corner_shop_core::{CartLineId, Identity, Price, PriceError, ProductId, Quantity};

/// One product entry in a cart.
///
/// `product_name` and `unit_price` are snapshots taken when the line was
/// created; checkout charges `unit_price` even if the catalog price changed
/// since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub owner: Identity,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Price,
    pub quantity: Quantity,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// Unit price × quantity.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if the subtotal cannot be stored as
    /// cents.
    pub fn subtotal(&self) -> Result<Price, PriceError> {
        self.unit_price.checked_times(self.quantity)
    }
}

/// A cart listing: lines most-recently-created first, plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub total: Price,
}

impl Cart {
    /// Build a cart from already-ordered lines.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if a subtotal or the grand total
    /// cannot be stored as cents.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, PriceError> {
        let total = Price::checked_sum(lines.iter().map(CartLine::subtotal))?;
        Ok(Self { lines, total })
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity.get()).sum()
    }
}

/// What a guest-to-customer merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Guest lines handed over to the customer unchanged.
    pub moved: usize,
    /// Guest lines folded into an existing customer line.
    pub combined: usize,
    /// Units discarded because the combined quantity exceeded stock.
    pub units_dropped: i64,
}

impl MergeOutcome {
    /// Whether the guest cart was empty.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.moved == 0 && self.combined == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use corner_shop_core::{CustomerId, GuestToken};

    use super::*;

    fn line(id: i64, cents: i64, quantity: i64) -> CartLine {
        CartLine {
            id: CartLineId::new(id),
            owner: Identity::Customer(CustomerId::new(1)),
            product_id: ProductId::new(id),
            product_name: format!("Product {id}"),
            unit_price: Price::from_cents(cents).unwrap(),
            quantity: Quantity::new(quantity).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(line(1, 1_250, 4).subtotal().unwrap().to_cents().unwrap(), 5_000);
    }

    #[test]
    fn test_cart_totals() {
        let cart = Cart::from_lines(vec![line(1, 1_000, 2), line(2, 250, 3)]).unwrap();
        assert_eq!(cart.total.to_cents().unwrap(), 2_750);
        assert_eq!(cart.item_count(), 5);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_empty_cart_is_valid() {
        let cart = Cart::from_lines(Vec::new()).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total, Price::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_total_past_storable_cents_is_an_error() {
        let lines = vec![line(1, i64::MAX, 1), line(2, 1, 1)];
        assert_eq!(Cart::from_lines(lines), Err(PriceError::OutOfRange));
        assert_eq!(
            line(3, i64::MAX, i64::MAX).subtotal(),
            Err(PriceError::OutOfRange)
        );
    }

    #[test]
    fn test_merge_outcome_noop() {
        assert!(MergeOutcome::default().is_noop());
        let outcome = MergeOutcome {
            moved: 1,
            ..MergeOutcome::default()
        };
        assert!(!outcome.is_noop());
    }

    #[test]
    fn test_guest_owned_line_serializes_owner() {
        let mut guest_line = line(3, 100, 1);
        guest_line.owner = Identity::Guest(GuestToken::generate());
        let json = serde_json::to_value(&guest_line).unwrap();
        assert_eq!(json["owner"]["kind"], "guest");
    }
}
