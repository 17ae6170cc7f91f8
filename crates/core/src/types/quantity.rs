//! Positive item quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative quantity.
    #[error("quantity must be greater than zero (got {0})")]
    NotPositive(i64),
}

/// A strictly positive number of units of one product.
///
/// Cart lines and order lines always hold a `Quantity`; raw integers coming
/// from forms go through [`Quantity::new`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` if `value <= 0`.
    pub const fn new(value: i64) -> Result<Self, QuantityError> {
        if value <= 0 {
            return Err(QuantityError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// The underlying count.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this quantity can be served from `stock` units.
    #[must_use]
    pub const fn fits_in(self, stock: i64) -> bool {
        self.0 <= stock
    }

    /// Sum of two quantities, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
