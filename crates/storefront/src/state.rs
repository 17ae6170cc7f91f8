//! The storefront facade shared by every caller.

use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::migrate::MigrateError;

use corner_shop_core::{
    CartLineId, CustomerId, GuestToken, Identity, OrderId, PaymentMethod, ProductId,
};

use crate::config::StoreConfig;
use crate::db;
use crate::error::{AppError, Result, set_sentry_user};
use crate::models::{Cart, CartLine, CheckoutSummary, MergeOutcome, OrderView, Product};
use crate::seed;
use crate::services::{
    AuthService, CartService, CatalogService, CheckoutService, LoginOutcome, OrderQueryService,
    SessionService,
};

/// Error opening the store.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

/// Convert a service error and report it if it is a store failure.
fn fail<E: Into<AppError>>(err: E) -> AppError {
    err.into().report()
}

/// Entry point for the transport layer.
///
/// This struct is cheaply cloneable via `Arc`. Each call is independent; the
/// caller passes the identity explicitly and nothing is cached between calls.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StoreConfig,
    pool: SqlitePool,
}

impl Storefront {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(config: StoreConfig, pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(StorefrontInner { config, pool }),
        }
    }

    /// Open the database described by `config`.
    ///
    /// Migrations are not run; call [`Storefront::migrate`] or the CLI
    /// `migrate` command.
    ///
    /// # Errors
    ///
    /// Returns `StartupError::Database` if the pool cannot be created.
    pub async fn connect(config: StoreConfig) -> std::result::Result<Self, StartupError> {
        let pool = db::create_pool(&config.database).await?;
        tracing::info!("Database pool created");
        Ok(Self::new(config, pool))
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `StartupError::Migrate` if a migration fails.
    pub async fn migrate(&self) -> std::result::Result<(), StartupError> {
        db::run_migrations(self.pool()).await?;
        Ok(())
    }

    /// Get a reference to the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Register a customer.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank name, malformed email or short password;
    /// `DuplicateEmail` if the email is taken.
    pub async fn register_customer(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> Result<CustomerId> {
        let customer = AuthService::new(self.pool())
            .register(name, email, password, phone)
            .await
            .map_err(fail)?;
        Ok(customer.id)
    }

    /// Check an email and password pair.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown email or a wrong password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<CustomerId> {
        let customer = AuthService::new(self.pool())
            .verify(email, password)
            .await
            .map_err(fail)?;
        Ok(customer.id)
    }

    /// Authenticate and merge the visitor's guest cart, if any.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown email or a wrong password. A failed
    /// merge does not fail the login.
    pub async fn login(
        &self,
        guest: Option<GuestToken>,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome> {
        let outcome = SessionService::new(self.pool())
            .login(guest, email, password)
            .await
            .map_err(fail)?;
        set_sentry_user(outcome.customer.id);
        Ok(outcome)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Products ordered by name.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the store cannot be read.
    pub async fn list_products(&self, in_stock_only: bool) -> Result<Vec<Product>> {
        CatalogService::new(self.pool())
            .list_products(in_stock_only)
            .await
            .map_err(fail)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// `NotFound` if the product doesn't exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        CatalogService::new(self.pool())
            .get_product(id)
            .await
            .map_err(fail)
    }

    /// Insert the default catalog when no products exist yet.
    ///
    /// Returns the number of products inserted.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the insert fails.
    pub async fn seed_catalog(&self) -> Result<usize> {
        seed::seed_catalog(self.pool()).await.map_err(fail)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add units of a product to the caller's cart.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `NotFound` or `InsufficientStock`.
    pub async fn add_to_cart(
        &self,
        owner: Identity,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartLine> {
        CartService::new(self.pool())
            .add_item(owner, product_id, quantity)
            .await
            .map_err(fail)
    }

    /// Overwrite the quantity of one of the caller's lines.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `NotFound` (missing or not owned) or
    /// `InsufficientStock`.
    pub async fn update_cart_line(
        &self,
        owner: Identity,
        line_id: CartLineId,
        quantity: i64,
    ) -> Result<CartLine> {
        CartService::new(self.pool())
            .update_quantity(owner, line_id, quantity)
            .await
            .map_err(fail)
    }

    /// Remove one of the caller's lines; `false` if there was nothing to remove.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the delete fails.
    pub async fn remove_cart_line(&self, owner: Identity, line_id: CartLineId) -> Result<bool> {
        CartService::new(self.pool())
            .remove_item(owner, line_id)
            .await
            .map_err(fail)
    }

    /// The caller's cart.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the store cannot be read.
    pub async fn cart(&self, owner: Identity) -> Result<Cart> {
        CartService::new(self.pool())
            .list_cart(owner)
            .await
            .map_err(fail)
    }

    /// Fold a guest cart into a customer's cart.
    ///
    /// [`Storefront::login`] already does this; call it directly only when
    /// authentication happened elsewhere.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the merge fails; nothing is changed.
    pub async fn merge_guest_cart(
        &self,
        guest: GuestToken,
        customer_id: CustomerId,
    ) -> Result<MergeOutcome> {
        CartService::new(self.pool())
            .merge_guest_cart(guest, customer_id)
            .await
            .map_err(fail)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Turn the customer's cart into an order.
    ///
    /// # Errors
    ///
    /// `EmptyCart` or `InsufficientStock`; nothing is persisted on error.
    pub async fn checkout(
        &self,
        customer_id: CustomerId,
        payment_method: &PaymentMethod,
    ) -> Result<OrderId> {
        CheckoutService::new(self.pool())
            .checkout(customer_id, payment_method)
            .await
            .map_err(fail)
    }

    /// The cart and contact details shown before placing an order.
    ///
    /// # Errors
    ///
    /// `NotFound` if the customer doesn't exist.
    pub async fn checkout_summary(&self, customer_id: CustomerId) -> Result<CheckoutSummary> {
        CheckoutService::new(self.pool())
            .summary(customer_id)
            .await
            .map_err(fail)
    }

    /// One of the customer's orders.
    ///
    /// # Errors
    ///
    /// `NotFound` if the order doesn't exist or belongs to someone else.
    pub async fn get_order(&self, customer_id: CustomerId, order_id: OrderId) -> Result<OrderView> {
        OrderQueryService::new(self.pool())
            .get_order(customer_id, order_id)
            .await
            .map_err(fail)
    }
}
