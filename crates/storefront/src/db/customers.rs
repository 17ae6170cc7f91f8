//! Customer repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use corner_shop_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::customer::{Customer, NewCustomer};

/// Internal row type for customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    name: String,
    email: Email,
    phone: String,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for credential lookups.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    customer: CustomerRow,
    password_hash: String,
}

/// Repository for customer database operations.
pub struct CustomerRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> CustomerRepository<'c> {
    /// Create a new customer repository on a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&mut self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, name, email, phone, created_at
            FROM customers
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Whether an email address is already registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&mut self, email: &Email) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE email = ?")
            .bind(email)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count > 0)
    }

    /// Create a customer with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &mut self,
        customer: &NewCustomer,
        password_hash: &str,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customers (name, email, password_hash, phone, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, email, phone, created_at
            ",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(password_hash)
        .bind(&customer.phone)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "email already exists"))?;

        Ok(row.into())
    }

    /// Get a customer together with their stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &mut self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, name, email, phone, created_at, password_hash
            FROM customers
            WHERE email = ?
            ",
        )
        .bind(email)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(|r| (r.customer.into(), r.password_hash)))
    }
}
