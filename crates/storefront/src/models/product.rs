//! Catalog product types.

use serde::Serialize;

use corner_shop_core::{Price, ProductId};

/// A catalog product with its live stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Current unit price. Cart lines snapshot this at add time.
    pub price: Price,
    /// Units available. Never negative.
    pub stock: i64,
}

impl Product {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Input for inserting a catalog product (seeding and tests).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i64,
}
