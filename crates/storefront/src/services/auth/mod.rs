//! Credential store.
//!
//! Registers customers with argon2id password hashes and verifies email and
//! password pairs. Unknown emails and wrong passwords are indistinguishable
//! to the caller.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;
use tracing::instrument;

use corner_shop_core::Email;

use crate::db::{self, CustomerRepository, RepositoryError};
use crate::models::customer::{Customer, NewCustomer};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash verified when the email is unknown, so both failure paths run argon2.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("corner-shop-dummy-password").ok());

/// Credential store service.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuthService<'a> {
    /// Create a new credential service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName` if the name is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    #[instrument(skip(self, name, password, phone))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> Result<Customer, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        let new_customer = NewCustomer {
            name: name.to_owned(),
            email,
            phone: phone.trim().to_owned(),
        };

        let mut tx = db::begin_write(self.pool).await?;
        let mut customers = CustomerRepository::new(&mut tx);
        if customers.email_exists(&new_customer.email).await? {
            return Err(AuthError::DuplicateEmail);
        }
        let customer = customers
            .create(&new_customer, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;
        tx.commit().await?;

        tracing::info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }

    /// Verify an email and password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is malformed or
    /// unknown, the password is wrong, or the stored hash is unreadable.
    #[instrument(skip(self, password))]
    pub async fn verify(&self, email: &str, password: &str) -> Result<Customer, AuthError> {
        let Ok(email) = Email::parse(email) else {
            burn_dummy_verification(password);
            return Err(AuthError::InvalidCredentials);
        };

        let mut conn = self.pool.acquire().await?;
        let found = CustomerRepository::new(&mut conn)
            .get_with_password_hash(&email)
            .await?;

        let Some((customer, password_hash)) = found else {
            burn_dummy_verification(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;
        Ok(customer)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn burn_dummy_verification(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}
