//! Product repository: catalog reads and guarded stock decrements.

use chrono::Utc;
use sqlx::SqliteConnection;

use corner_shop_core::{Price, ProductId, Quantity};

use super::RepositoryError;
use crate::models::product::{NewProduct, Product};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price_cents: i64,
    stock: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::from_cents(row.price_cents).map_err(|e| {
            RepositoryError::DataCorruption(format!("product {} price: {e}", row.id))
        })?;
        if row.stock < 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "product {} has negative stock {}",
                row.id, row.stock
            )));
        }

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
            stock: row.stock,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ProductRepository<'c> {
    /// Create a new product repository on a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// List products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list(&mut self, in_stock_only: bool) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price_cents, stock
            FROM products
            WHERE (? = 0 OR stock > 0)
            ORDER BY name ASC, id ASC
            ",
        )
        .bind(in_stock_only)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored price is invalid.
    pub async fn get_by_id(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price_cents, stock
            FROM products
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Get the current stock of a product, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_stock(&mut self, id: ProductId) -> Result<Option<i64>, RepositoryError> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(stock)
    }

    /// Decrement stock only if enough units remain.
    ///
    /// The check and the write are one statement, so two callers racing for
    /// the last units cannot both succeed.
    ///
    /// # Returns
    ///
    /// Returns `true` if the stock was decremented, `false` if the product is
    /// missing or has fewer than `quantity` units.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn try_decrement_stock(
        &mut self,
        id: ProductId,
        quantity: Quantity,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET stock = stock - ?1
            WHERE id = ?2 AND stock >= ?1
            ",
        )
        .bind(quantity.get())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Overwrite the stock level of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if `stock` is negative.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_stock(&mut self, id: ProductId, stock: i64) -> Result<(), RepositoryError> {
        if stock < 0 {
            return Err(RepositoryError::Conflict(format!(
                "stock cannot be negative (got {stock})"
            )));
        }

        let result = sqlx::query("UPDATE products SET stock = ? WHERE id = ?")
            .bind(stock)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Insert a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the price cannot be stored.
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// negative stock rejected by the table constraint).
    pub async fn create(&mut self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let price_cents = product
            .price
            .to_cents()
            .map_err(|e| RepositoryError::DataCorruption(format!("product price: {e}")))?;

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, description, price_cents, stock, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, description, price_cents, stock
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(price_cents)
        .bind(product.stock)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await?;

        Product::try_from(row)
    }

    /// Count catalog products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&mut self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }
}
