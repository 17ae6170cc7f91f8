//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Customer registration and credential verification
//! - `catalog` - Read-only product listing
//! - `cart` - Cart mutations and the guest-to-customer merge
//! - `checkout` - Cart to order conversion
//! - `orders` - Order views for their owners
//! - `session` - Login with the one-time cart merge
//!
//! Services borrow the pool and are cheap to construct per call.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod session;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use catalog::{CatalogError, CatalogService};
pub use checkout::{CheckoutError, CheckoutService, CheckoutStage};
pub use orders::{OrderQueryError, OrderQueryService};
pub use session::{CartMerge, LoginOutcome, SessionService};
