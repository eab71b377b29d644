//! # Customer Repository
//!
//! Database operations for customers.
//!
//! ## Key Operations
//! - CRUD with paginated listing (newest first)
//! - Unique tax-identifier (CNPJ) enforcement
//! - In-transaction existence lookup for the placement engine

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pedido_core::validation::validate_customer_payload;
use pedido_core::{Customer, Page, Paginated};

/// Repository for customer database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CustomerRepository::new(pool);
///
/// let customer = repo
///     .create("Acme Ltda", "11.222.333/0001-81", "billing@acme.example")
///     .await?;
/// let page = repo.list(Page::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a new customer.
    ///
    /// The payload is validated first (name, CNPJ checksum, email) and
    /// rejected with [`DbError::Validation`] carrying every problem found.
    /// A duplicate CNPJ surfaces as [`DbError::UniqueViolation`] via the
    /// `customers.cnpj` unique index.
    pub async fn create(&self, legal_name: &str, cnpj: &str, email: &str) -> DbResult<Customer> {
        validate_customer_payload(legal_name, cnpj, email).map_err(DbError::Validation)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            legal_name: legal_name.to_string(),
            cnpj: cnpj.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        debug!(customer_id = %customer.id, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, legal_name, cnpj, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.legal_name)
        .bind(&customer.cnpj)
        .bind(&customer.email)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    ///
    /// Returns `None` if not found (use [`require`](Self::require) when
    /// absence is an error).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, legal_name, cnpj, email, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID, failing with [`DbError::NotFound`] if absent.
    pub async fn require(&self, id: &str) -> DbResult<Customer> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Gets a customer by CNPJ.
    pub async fn get_by_cnpj(&self, cnpj: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, legal_name, cnpj, email, created_at, updated_at
            FROM customers
            WHERE cnpj = ?1
            "#,
        )
        .bind(cnpj)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers, newest first.
    pub async fn list(&self, page: Page) -> DbResult<Paginated<Customer>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, legal_name, cnpj, email, created_at, updated_at
            FROM customers
            ORDER BY created_at DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(customers, total, page))
    }

    /// Updates a customer's editable fields.
    ///
    /// The payload goes through the same validation pass as
    /// [`create`](Self::create); a CNPJ change is re-checked for uniqueness
    /// by the same index.
    pub async fn update(
        &self,
        id: &str,
        legal_name: &str,
        cnpj: &str,
        email: &str,
    ) -> DbResult<Customer> {
        validate_customer_payload(legal_name, cnpj, email).map_err(DbError::Validation)?;

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET legal_name = ?2, cnpj = ?3, email = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(legal_name)
        .bind(cnpj)
        .bind(email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        debug!(customer_id = %id, "Updated customer");
        self.require(id).await
    }

    /// Deletes a customer.
    ///
    /// Fails with [`DbError::ForeignKeyViolation`] while orders still
    /// reference the customer.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        debug!(customer_id = %id, "Deleted customer");
        Ok(())
    }

    /// Counts all customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Fetches a customer on an open transaction's connection.
    ///
    /// Used by the placement engine so the customer lookup shares the
    /// placement transaction.
    pub async fn get_on_conn(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, legal_name, cnpj, email, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(customer)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
