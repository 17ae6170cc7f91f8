//! Customer domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use corner_shop_core::{CustomerId, Email};

/// A registered customer.
///
/// The password hash never leaves the credential store, so it is not part of
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Login email (unique).
    pub email: Email,
    /// Contact phone, empty when not given.
    pub phone: String,
    /// When the customer registered.
    pub created_at: DateTime<Utc>,
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: String,
}
