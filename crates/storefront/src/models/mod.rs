//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the row types in
//! [`crate::db`].

pub mod cart;
pub mod customer;
pub mod order;
pub mod product;

pub use cart::{Cart, CartLine, MergeOutcome};
pub use customer::{Customer, NewCustomer};
pub use order::{CheckoutSummary, Order, OrderLine, OrderView, Payment};
pub use product::{NewProduct, Product};
