//! Core types for Corner Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod identity;
pub mod payment;
pub mod price;
pub mod quantity;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{GuestToken, Identity};
pub use payment::{PaymentMethod, PaymentMethodError};
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
pub use status::*;
