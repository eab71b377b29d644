//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD with paginated listing (newest first)
//! - Transactional stock primitives used by the placement engine
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  Guarded Conditional Decrement                      │
//! │                                                                     │
//! │  Inside the placement transaction:                                  │
//! │                                                                     │
//! │  1. get_on_conn(tx, id)          ← read current stock              │
//! │  2. stock >= requested?          ← explicit availability check     │
//! │  3. UPDATE products                                                 │
//! │     SET stock = stock + Δ        ← Δ is negative                   │
//! │     WHERE id = ?                                                    │
//! │       AND stock + Δ >= 0        ← precondition re-checked in SQL  │
//! │                                                                     │
//! │  rows_affected == 0  →  DbError::Conflict                          │
//! │  (another writer changed stock between read and write)             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pedido_core::validation::{validate_description, validate_product_payload, validate_unit_price};
use pedido_core::{Page, Paginated, Product};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a new product.
    ///
    /// The payload is validated first (description, non-negative price and
    /// stock) and rejected with [`DbError::Validation`] before any SQL runs.
    pub async fn create(
        &self,
        description: &str,
        unit_price_cents: i64,
        stock: i64,
    ) -> DbResult<Product> {
        validate_product_payload(description, unit_price_cents, stock)
            .map_err(DbError::Validation)?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            unit_price_cents,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        debug!(product_id = %product.id, "Creating product");

        sqlx::query(
            r#"
            INSERT INTO products (id, description, unit_price_cents, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.description)
        .bind(product.unit_price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, description, unit_price_cents, stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID, failing with [`DbError::NotFound`] if absent.
    pub async fn require(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists products, newest first.
    pub async fn list(&self, page: Page) -> DbResult<Paginated<Product>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, description, unit_price_cents, stock, created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(products, total, page))
    }

    /// Updates a product's catalog fields.
    ///
    /// Stock is deliberately not editable here; stock only moves through
    /// [`apply_stock_delta`](Self::apply_stock_delta).
    pub async fn update(
        &self,
        id: &str,
        description: &str,
        unit_price_cents: i64,
    ) -> DbResult<Product> {
        let mut errors = Vec::new();
        if let Err(e) = validate_description(description) {
            errors.push(e);
        }
        if let Err(e) = validate_unit_price(unit_price_cents) {
            errors.push(e);
        }
        if !errors.is_empty() {
            return Err(DbError::Validation(errors));
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET description = ?2, unit_price_cents = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(description)
        .bind(unit_price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = %id, "Updated product");
        self.require(id).await
    }

    /// Deletes a product.
    ///
    /// Fails with [`DbError::ForeignKeyViolation`] while order lines still
    /// reference the product.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = %id, "Deleted product");
        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Restocks a product (positive delta) outside any placement.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<Product> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1 AND stock + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.require(id).await
    }

    /// Fetches a product on an open transaction's connection.
    ///
    /// Within a transaction this observes that transaction's own prior
    /// writes, so repeated lines for one product see earlier decrements.
    pub async fn get_on_conn(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, description, unit_price_cents, stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(product)
    }

    /// Applies a stock delta on an open transaction's connection.
    ///
    /// The `stock + delta >= 0` guard re-checks the availability
    /// precondition at write time. Zero rows affected after the product was
    /// just read on the same connection means another writer moved stock
    /// beneath us: reported as [`DbError::Conflict`].
    pub async fn apply_stock_delta(
        conn: &mut SqliteConnection,
        id: &str,
        delta: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1 AND stock + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict(format!(
                "stock precondition failed for product {id}"
            )));
        }

        debug!(product_id = %id, delta = delta, "Applied stock delta");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create("Widget", 1999, 10).await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.description, "Widget");
        assert_eq!(fetched.unit_price_cents, 1999);
        assert_eq!(fetched.stock, 10);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let db = test_db().await;
        let repo = db.products();

        // A negative price is structural bad input, not a transient fault
        let err = repo.create("Widget", -1, 5).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert!(!err.is_retryable());

        let err = repo.create("", -1, -1).await.unwrap_err();
        match err {
            DbError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_payload() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create("Widget", 1999, 10).await.unwrap();

        let err = repo.update(&product.id, "", -100).await.unwrap_err();
        match err {
            DbError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected Validation, got {other:?}"),
        }

        let unchanged = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(unchanged.unit_price_cents, 1999);
    }

    #[tokio::test]
    async fn test_update_does_not_touch_stock() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.create("Widget", 1999, 10).await.unwrap();
        let updated = repo.update(&product.id, "Widget Mk2", 2499).await.unwrap();

        assert_eq!(updated.description, "Widget Mk2");
        assert_eq!(updated.unit_price_cents, 2499);
        assert_eq!(updated.stock, 10);
    }

    #[tokio::test]
    async fn test_apply_stock_delta_guards_negative() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create("Widget", 1999, 5).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        ProductRepository::apply_stock_delta(&mut tx, &product.id, -3)
            .await
            .unwrap();

        // Remaining stock inside the transaction is 2; taking 3 more fails
        let err = ProductRepository::apply_stock_delta(&mut tx, &product.id, -3)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        tx.rollback().await.unwrap();

        // Rollback restored the original stock
        let after = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 5);
    }

    #[tokio::test]
    async fn test_restock() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create("Widget", 1999, 2).await.unwrap();

        let restocked = repo.restock(&product.id, 8).await.unwrap();
        assert_eq!(restocked.stock, 10);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let db = test_db().await;
        let repo = db.products();

        for i in 0..3 {
            repo.create(&format!("Product {i}"), 100 * (i + 1), 5)
                .await
                .unwrap();
        }

        let page = repo.list(Page::new(2, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total_pages, 2);
    }
}
