//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are held as a [`Decimal`] with two fractional digits and persisted
//! as integer cents, so sums and line subtotals never pick up binary
//! floating-point error.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::quantity::Quantity;

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount does not fit in the storage representation.
    #[error("price is out of range")]
    OutOfRange,
}

/// A non-negative monetary amount in the store's single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Build a price from a decimal amount, rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero.
    /// Returns `PriceError::OutOfRange` if the amount cannot be stored as
    /// `i64` cents.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Self::storable(amount.round_dp(2))
    }

    /// Build a price from an amount in cents.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for negative cent amounts.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        Ok(Self(Decimal::new(cents, 2)))
    }

    /// The amount in cents, as persisted.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if the amount does not fit in an `i64`.
    pub fn to_cents(self) -> Result<i64, PriceError> {
        cents_of(self.0).ok_or(PriceError::OutOfRange)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Unit price multiplied by a quantity (a line subtotal).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if the product cannot be stored as
    /// `i64` cents.
    pub fn checked_times(self, quantity: Quantity) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity.get()))
            .ok_or(PriceError::OutOfRange)
            .and_then(Self::storable)
    }

    /// Sum of two amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if the sum cannot be stored as `i64`
    /// cents.
    pub fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        self.0
            .checked_add(other.0)
            .ok_or(PriceError::OutOfRange)
            .and_then(Self::storable)
    }

    /// Sum of any number of amounts; zero for none.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` as soon as the running total cannot be
    /// stored as `i64` cents.
    pub fn checked_sum<I>(amounts: I) -> Result<Self, PriceError>
    where
        I: IntoIterator<Item = Result<Self, PriceError>>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.checked_add(amount?))
    }

    fn storable(amount: Decimal) -> Result<Self, PriceError> {
        cents_of(amount)
            .map(|_| Self(amount))
            .ok_or(PriceError::OutOfRange)
    }
}

fn cents_of(amount: Decimal) -> Option<i64> {
    amount.checked_mul(Decimal::ONE_HUNDRED)?.round().to_i64()
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
