//! Database operations for the storefront `SQLite` store.
//!
//! ## Tables
//!
//! - `customers` - Registered customers and their password hashes
//! - `products` - Catalog with live stock levels
//! - `cart_lines` - Cart contents for customers and guests
//! - `orders` / `order_lines` - Committed orders with captured prices
//! - `payments` - One payment intent per order
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/`, embedded at
//! compile time, and run via:
//! ```bash
//! cargo run -p corner-shop-cli -- migrate
//! ```
//!
//! # Transactions
//!
//! Repositories borrow a `SqliteConnection`, so the same repository code runs
//! against a pooled connection for reads or inside a transaction for writes.
//! Every multi-statement write goes through [`begin_write`].

pub mod cart;
pub mod customers;
pub mod orders;
pub mod products;

use std::str::FromStr;

use secrecy::ExposeSecret;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, Transaction};
use thiserror::Error;

pub use cart::CartRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

use crate::config::DatabaseConfig;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint failure to `Conflict`, anything else to `Database`.
    pub(crate) fn on_unique_violation(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(what.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `SQLite` connection pool from configuration.
///
/// File databases run in WAL mode with foreign keys enforced. In-memory
/// databases exist per connection, so their pool is pinned to a single
/// connection that is never recycled.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the database cannot be opened.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = config.is_in_memory();

    let mut options = SqliteConnectOptions::from_str(config.url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);
    if !in_memory {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    let pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);
    let pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(config.max_connections)
    };

    pool_options.connect_with(options).await
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history
/// diverges from the embedded set.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Begin a write transaction that takes the database write lock up-front
/// (`BEGIN IMMEDIATE`).
///
/// A concurrent writer waits up to the busy timeout and then reads the first
/// writer's committed state, so read-check-write sequences inside the
/// transaction are serialized.
///
/// # Errors
///
/// Returns `sqlx::Error` if no connection is available or the lock cannot be
/// taken within the busy timeout.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        assert_eq!(RepositoryError::NotFound.to_string(), "not found");
        assert_eq!(
            RepositoryError::Conflict("email already exists".to_owned()).to_string(),
            "constraint violation: email already exists"
        );
    }

    #[test]
    fn test_non_database_error_is_not_conflict() {
        let err = RepositoryError::on_unique_violation(sqlx::Error::RowNotFound, "dup");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
