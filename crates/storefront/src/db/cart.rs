//! Cart line repository.
//!
//! A line is owned by either a customer or a guest token, never both. Owner
//! filters use `SQLite`'s NULL-safe `IS` so one query shape serves both kinds.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use corner_shop_core::{CartLineId, CustomerId, GuestToken, Identity, Price, ProductId, Quantity};

use super::RepositoryError;
use crate::models::cart::CartLine;
use crate::models::product::Product;

/// Internal row type for cart line queries.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: CartLineId,
    customer_id: Option<CustomerId>,
    guest_token: Option<String>,
    product_id: ProductId,
    product_name: String,
    unit_price_cents: i64,
    quantity: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let owner = match (row.customer_id, row.guest_token.as_deref()) {
            (Some(customer_id), None) => Identity::Customer(customer_id),
            (None, Some(token)) => Identity::Guest(GuestToken::parse(token).map_err(|e| {
                RepositoryError::DataCorruption(format!("cart line {} guest token: {e}", row.id))
            })?),
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "cart line {} must have exactly one owner",
                    row.id
                )));
            }
        };
        let unit_price = Price::from_cents(row.unit_price_cents).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart line {} price: {e}", row.id))
        })?;
        let quantity = Quantity::new(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart line {} quantity: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            owner,
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price,
            quantity,
            created_at: row.created_at,
        })
    }
}

/// Split an owner into the `(customer_id, guest_token)` column pair.
fn owner_columns(owner: Identity) -> (Option<CustomerId>, Option<String>) {
    match owner {
        Identity::Customer(id) => (Some(id), None),
        Identity::Guest(token) => (None, Some(token.to_db_string())),
    }
}

/// Repository for cart line database operations.
pub struct CartRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> CartRepository<'c> {
    /// Create a new cart repository on a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// All lines owned by `owner`, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored line is invalid.
    pub async fn list(&mut self, owner: Identity) -> Result<Vec<CartLine>, RepositoryError> {
        let (customer_id, guest_token) = owner_columns(owner);
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, customer_id, guest_token, product_id, product_name,
                   unit_price_cents, quantity, created_at
            FROM cart_lines
            WHERE customer_id IS ? AND guest_token IS ?
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(customer_id)
        .bind(guest_token)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// The line `owner` holds for `product_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored line is invalid.
    pub async fn find_for_product(
        &mut self,
        owner: Identity,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let (customer_id, guest_token) = owner_columns(owner);
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, customer_id, guest_token, product_id, product_name,
                   unit_price_cents, quantity, created_at
            FROM cart_lines
            WHERE customer_id IS ? AND guest_token IS ? AND product_id = ?
            ",
        )
        .bind(customer_id)
        .bind(guest_token)
        .bind(product_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(CartLine::try_from).transpose()
    }

    /// A line by ID, only if it belongs to `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored line is invalid.
    pub async fn get_owned(
        &mut self,
        owner: Identity,
        line_id: CartLineId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let (customer_id, guest_token) = owner_columns(owner);
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, customer_id, guest_token, product_id, product_name,
                   unit_price_cents, quantity, created_at
            FROM cart_lines
            WHERE id = ? AND customer_id IS ? AND guest_token IS ?
            ",
        )
        .bind(line_id)
        .bind(customer_id)
        .bind(guest_token)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(CartLine::try_from).transpose()
    }

    /// Insert a new line, snapshotting the product's current name and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `owner` already has a line for
    /// this product.
    /// Returns `RepositoryError::DataCorruption` if the price cannot be stored.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &mut self,
        owner: Identity,
        product: &Product,
        quantity: Quantity,
    ) -> Result<CartLine, RepositoryError> {
        let (customer_id, guest_token) = owner_columns(owner);
        let price_cents = product
            .price
            .to_cents()
            .map_err(|e| RepositoryError::DataCorruption(format!("product price: {e}")))?;

        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            INSERT INTO cart_lines
                (customer_id, guest_token, product_id, product_name,
                 unit_price_cents, quantity, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, customer_id, guest_token, product_id, product_name,
                      unit_price_cents, quantity, created_at
            ",
        )
        .bind(customer_id)
        .bind(guest_token)
        .bind(product.id)
        .bind(&product.name)
        .bind(price_cents)
        .bind(quantity.get())
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "cart line already exists"))?;

        CartLine::try_from(row)
    }

    /// Overwrite a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_quantity(
        &mut self,
        line_id: CartLineId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cart_lines SET quantity = ? WHERE id = ?")
            .bind(quantity.get())
            .bind(line_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a line if it belongs to `owner`.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_owned(
        &mut self,
        owner: Identity,
        line_id: CartLineId,
    ) -> Result<bool, RepositoryError> {
        let (customer_id, guest_token) = owner_columns(owner);
        let result = sqlx::query(
            "DELETE FROM cart_lines WHERE id = ? AND customer_id IS ? AND guest_token IS ?",
        )
        .bind(line_id)
        .bind(customer_id)
        .bind(guest_token)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hand a guest line over to a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    /// Returns `RepositoryError::Conflict` if the customer already has a line
    /// for the same product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn reassign_to_customer(
        &mut self,
        line_id: CartLineId,
        customer_id: CustomerId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_lines SET customer_id = ?, guest_token = NULL WHERE id = ?",
        )
        .bind(customer_id)
        .bind(line_id)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "cart line already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a line by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&mut self, line_id: CartLineId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_lines WHERE id = ?")
            .bind(line_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    /// Empty a customer's cart.
    ///
    /// # Returns
    ///
    /// Returns the number of lines deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE customer_id = ?")
            .bind(customer_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }
}
