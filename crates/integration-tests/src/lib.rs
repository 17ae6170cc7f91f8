//! Integration test harness for Corner Shop.
//!
//! Each test gets its own file-backed `SQLite` database in the system temp
//! directory, fully migrated, and removed again when the [`TestStore`] is
//! dropped.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p corner-shop-integration-tests
//! ```

use std::ops::Deref;
use std::path::PathBuf;

use sqlx::SqlitePool;
use uuid::Uuid;

use corner_shop_core::{CustomerId, Price, ProductId};
use corner_shop_storefront::db::ProductRepository;
use corner_shop_storefront::models::NewProduct;
use corner_shop_storefront::{StoreConfig, Storefront};

/// Password used by every customer created through [`TestStore::customer`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// A migrated store backed by a throwaway database file.
pub struct TestStore {
    store: Storefront,
    path: PathBuf,
}

impl TestStore {
    /// Create and migrate a fresh database.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created or migrated.
    pub async fn new() -> Self {
        let path = std::env::temp_dir().join(format!("corner-shop-test-{}.db", Uuid::new_v4()));
        let config = StoreConfig::for_database(format!("sqlite://{}", path.display()));

        let store = Storefront::connect(config)
            .await
            .expect("Failed to open test database");
        store.migrate().await.expect("Failed to run migrations");

        Self { store, path }
    }

    /// The underlying pool, for assertions that bypass the facade.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        self.store.pool()
    }

    /// A cheap clone of the facade, for moving into spawned tasks.
    #[must_use]
    pub fn handle(&self) -> Storefront {
        self.store.clone()
    }

    /// Insert a product.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub async fn product(&self, name: &str, price_cents: i64, stock: i64) -> ProductId {
        let mut conn = self.pool().acquire().await.expect("acquire connection");
        ProductRepository::new(&mut conn)
            .create(&NewProduct {
                name: name.to_owned(),
                description: format!("{name} for tests"),
                price: Price::from_cents(price_cents).expect("valid price"),
                stock,
            })
            .await
            .expect("Failed to insert product")
            .id
    }

    /// Register a customer with [`TEST_PASSWORD`].
    ///
    /// # Panics
    ///
    /// Panics if registration fails.
    pub async fn customer(&self, name: &str, email: &str) -> CustomerId {
        self.store
            .register_customer(name, email, TEST_PASSWORD, "")
            .await
            .expect("Failed to register customer")
    }

    /// Current stock of a product.
    ///
    /// # Panics
    ///
    /// Panics if the product doesn't exist.
    pub async fn stock(&self, id: ProductId) -> i64 {
        let mut conn = self.pool().acquire().await.expect("acquire connection");
        ProductRepository::new(&mut conn)
            .get_stock(id)
            .await
            .expect("query stock")
            .expect("product exists")
    }

    /// Overwrite a product's stock.
    ///
    /// # Panics
    ///
    /// Panics if the update fails.
    pub async fn set_stock(&self, id: ProductId, stock: i64) {
        let mut conn = self.pool().acquire().await.expect("acquire connection");
        ProductRepository::new(&mut conn)
            .set_stock(id, stock)
            .await
            .expect("Failed to set stock");
    }

    /// Change a product's catalog price.
    ///
    /// # Panics
    ///
    /// Panics if the update fails.
    pub async fn set_price_cents(&self, id: ProductId, price_cents: i64) {
        sqlx::query("UPDATE products SET price_cents = ? WHERE id = ?")
            .bind(price_cents)
            .bind(id.as_i64())
            .execute(self.pool())
            .await
            .expect("Failed to set price");
    }

    /// Row count of a table.
    ///
    /// # Panics
    ///
    /// Panics if the query fails.
    pub async fn count(&self, table: &'static str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.pool())
            .await
            .expect("Failed to count rows")
    }

    /// Row counts of the order-side tables: `(orders, order_lines, payments)`.
    pub async fn order_counts(&self) -> (i64, i64, i64) {
        (
            self.count("orders").await,
            self.count("order_lines").await,
            self.count("payments").await,
        )
    }
}

impl Deref for TestStore {
    type Target = Storefront;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl Drop for TestStore {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
