//! Catalog reader.

use sqlx::SqlitePool;
use thiserror::Error;

use corner_shop_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::product::Product;

/// Errors that can occur when reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product does not exist.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Read-only catalog service.
pub struct CatalogService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Products ordered by name, optionally only those with stock left.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the database operation fails.
    pub async fn list_products(&self, in_stock_only: bool) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let products = ProductRepository::new(&mut conn).list(in_stock_only).await?;
        Ok(products)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product doesn't exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        ProductRepository::new(&mut conn)
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }
}
