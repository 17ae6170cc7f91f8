//! Unified error handling with Sentry integration.
//!
//! Every [`Storefront`](crate::Storefront) operation returns `Result<T, AppError>`.
//! Service errors are folded into this taxonomy; store failures are captured
//! to Sentry on the way out.

use thiserror::Error;

use corner_shop_core::{CustomerId, ProductId};

use crate::db::RepositoryError;
use crate::forms::FormError;
use crate::services::{AuthError, CartError, CatalogError, CheckoutError, OrderQueryError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (or not visible to the caller).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Requested quantity exceeds stock.
    #[error(
        "Insufficient stock for {product_name} (product {product_id}): requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        requested: i64,
        available: i64,
    },

    /// Quantity was zero or negative.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Email already registered.
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// Wrong email or password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Malformed or missing input at the boundary.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The store could not complete the operation.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] RepositoryError),
}

impl AppError {
    /// Whether this error is a store failure rather than a rejected request.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Capture store failures to Sentry, passing every error through.
    pub(crate) fn report(self) -> Self {
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Store error"
            );
        }
        self
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::DuplicateEmail => Self::DuplicateEmail,
            AuthError::InvalidEmail(e) => Self::InvalidInput(e.to_string()),
            AuthError::MissingName => Self::InvalidInput("name is required".to_string()),
            AuthError::WeakPassword(msg) => Self::InvalidInput(msg),
            AuthError::Repository(e) => Self::StoreUnavailable(e),
            AuthError::PasswordHash => Self::StoreUnavailable(RepositoryError::DataCorruption(
                "password hashing failed".to_string(),
            )),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::NotFound(format!("product {id}")),
            CatalogError::Repository(e) => Self::StoreUnavailable(e),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::InvalidQuantity(q) => Self::InvalidQuantity(q),
            CartError::ProductNotFound(id) => Self::NotFound(format!("product {id}")),
            CartError::LineNotFound(id) => Self::NotFound(format!("cart line {id}")),
            CartError::InsufficientStock {
                product_id,
                product_name,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                product_name,
                requested,
                available,
            },
            CartError::AmountOutOfRange(e) => Self::InvalidInput(format!("cart total: {e}")),
            CartError::Repository(e) => Self::StoreUnavailable(e),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyCart => Self::EmptyCart,
            CheckoutError::InsufficientStock {
                product_id,
                product_name,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                product_name,
                requested,
                available,
            },
            CheckoutError::CustomerNotFound(id) => Self::NotFound(format!("customer {id}")),
            CheckoutError::AmountOutOfRange(e) => Self::InvalidInput(format!("order total: {e}")),
            CheckoutError::Repository(e) => Self::StoreUnavailable(e),
        }
    }
}

impl From<OrderQueryError> for AppError {
    fn from(err: OrderQueryError) -> Self {
        match err {
            OrderQueryError::NotFound(id) => Self::NotFound(format!("order {id}")),
            OrderQueryError::Repository(e) => Self::StoreUnavailable(e),
        }
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a customer ID.
///
/// Call this after successful authentication to associate errors with customers.
pub fn set_sentry_user(customer_id: CustomerId) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_password_and_unknown_email_look_the_same() {
        let err: AppError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_weak_password_is_invalid_input() {
        let err: AppError = AuthError::WeakPassword("too short".to_string()).into();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_cart_stock_error_keeps_details() {
        let err: AppError = CartError::InsufficientStock {
            product_id: ProductId::new(5),
            product_name: "Headset".to_string(),
            requested: 11,
            available: 9,
        }
        .into();

        match err {
            AppError::InsufficientStock {
                product_id,
                requested,
                available,
                ..
            } => {
                assert_eq!(product_id, ProductId::new(5));
                assert_eq!(requested, 11);
                assert_eq!(available, 9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_repository_errors_are_internal() {
        let err: AppError = CheckoutError::Repository(RepositoryError::NotFound).into();
        assert!(err.is_internal());

        let err: AppError = OrderQueryError::NotFound(corner_shop_core::OrderId::new(4)).into();
        assert!(!err.is_internal());
        assert_eq!(err.to_string(), "Not found: order 4");
    }

    #[test]
    fn test_amount_out_of_range_is_a_rejected_request() {
        let err: AppError =
            CartError::AmountOutOfRange(corner_shop_core::PriceError::OutOfRange).into();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_form_error_is_invalid_input() {
        let err: AppError = FormError::Missing("email").into();
        assert_eq!(err.to_string(), "Invalid input: email is required");
    }
}
