//! Identity bridge between anonymous and authenticated visitors.
//!
//! Login is the single point where a guest's cart joins the customer's cart.
//! A failed merge is logged and rolled back but never fails the login.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::instrument;

use corner_shop_core::{GuestToken, Identity};

use super::auth::{AuthError, AuthService};
use super::cart::CartService;
use crate::models::cart::MergeOutcome;
use crate::models::customer::Customer;

/// What happened to the guest cart during login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CartMerge {
    /// The visitor had no guest token.
    Skipped,
    Merged(MergeOutcome),
    /// The merge was rolled back; the guest cart is untouched.
    Failed,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub customer: Customer,
    pub cart_merge: CartMerge,
}

impl LoginOutcome {
    /// The identity to use for every call after login.
    #[must_use]
    pub const fn identity(&self) -> Identity {
        Identity::Customer(self.customer.id)
    }
}

/// Login service.
pub struct SessionService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionService<'a> {
    /// Create a new session service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Verify credentials, then merge the guest cart (if any) into the
    /// customer's cart exactly once.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email or password is
    /// wrong. Merge failures are not errors.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        guest: Option<GuestToken>,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let customer = AuthService::new(self.pool).verify(email, password).await?;

        let cart_merge = match guest {
            None => CartMerge::Skipped,
            Some(token) => match CartService::new(self.pool)
                .merge_guest_cart(token, customer.id)
                .await
            {
                Ok(outcome) => CartMerge::Merged(outcome),
                Err(err) => {
                    tracing::warn!(
                        customer_id = %customer.id,
                        error = %err,
                        "guest cart merge failed; keeping guest cart"
                    );
                    CartMerge::Failed
                }
            },
        };

        tracing::info!(customer_id = %customer.id, "customer logged in");
        Ok(LoginOutcome {
            customer,
            cart_merge,
        })
    }
}
