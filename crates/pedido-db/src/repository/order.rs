//! # Order Repository
//!
//! Database operations for orders and their lines.
//!
//! ## Shape
//! Orders are written only through [`save_order`](OrderRepository::save_order)
//! on an open placement transaction; there is no update path. The read side
//! hydrates each order explicitly (header, then customer, then lines) rather
//! than relying on joins that smear the aggregate across rows.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use pedido_core::{Customer, Order, OrderDetail, OrderLine, Page, Paginated};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order header and all of its lines on an open transaction.
    ///
    /// The caller owns the transaction; nothing is visible until it commits,
    /// and dropping the transaction discards the whole aggregate.
    pub async fn save_order(
        conn: &mut SqliteConnection,
        order: &Order,
        lines: &[OrderLine],
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, total_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(order.total_cents)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines
                    (id, order_id, line_no, product_id, description_snapshot,
                     quantity, unit_price_cents, subtotal_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&line.id)
            .bind(&line.order_id)
            .bind(line.line_no)
            .bind(&line.product_id)
            .bind(&line.description_snapshot)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.subtotal_cents)
            .execute(&mut *conn)
            .await?;
        }

        debug!(order_id = %order.id, lines = lines.len(), "Saved order aggregate");
        Ok(())
    }

    /// Gets a fully hydrated order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<OrderDetail>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_id, total_cents, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        Ok(Some(self.hydrate(order).await?))
    }

    /// Gets a hydrated order, failing with [`DbError::NotFound`] if absent.
    pub async fn require(&self, id: &str) -> DbResult<OrderDetail> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Lists hydrated orders, newest first.
    pub async fn list(&self, page: Page) -> DbResult<Paginated<OrderDetail>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        let headers = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_id, total_cents, created_at, updated_at
            FROM orders
            ORDER BY created_at DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(headers.len());
        for order in headers {
            details.push(self.hydrate(order).await?);
        }

        Ok(Paginated::new(details, total, page))
    }

    /// Deletes an order; its lines go with it (cascade).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        debug!(order_id = %id, "Deleted order");
        Ok(())
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Resolves the customer and lines of an order header.
    async fn hydrate(&self, order: Order) -> DbResult<OrderDetail> {
        let customer: Customer = sqlx::query_as(
            r#"
            SELECT id, legal_name, cnpj, email, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(&order.customer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", &order.customer_id))?;

        let lines = Self::lines_for(&self.pool, &order.id).await?;

        Ok(OrderDetail {
            order,
            customer,
            lines,
        })
    }

    /// Fetches an order's lines in input order.
    async fn lines_for(pool: &SqlitePool, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, line_no, product_id, description_snapshot,
                   quantity, unit_price_cents, subtotal_cents
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(pool)
        .await?;

        Ok(lines)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_order(db: &Database) -> (String, String) {
        let customer = db
            .customers()
            .create("Acme Ltda", "11.222.333/0001-81", "a@acme.example")
            .await
            .unwrap();
        let product = db.products().create("Widget", 1999, 10).await.unwrap();

        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            total_cents: 3998,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let lines = vec![OrderLine {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            line_no: 1,
            product_id: product.id.clone(),
            description_snapshot: product.description.clone(),
            quantity: 2,
            unit_price_cents: 1999,
            subtotal_cents: 3998,
        }];

        let mut tx = db.pool().begin().await.unwrap();
        OrderRepository::save_order(&mut tx, &order, &lines)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        (order.id, product.id)
    }

    #[tokio::test]
    async fn test_save_and_hydrate_order() {
        let db = test_db().await;
        let (order_id, product_id) = seed_order(&db).await;

        let detail = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(detail.order.total_cents, 3998);
        assert_eq!(detail.customer.legal_name, "Acme Ltda");
        assert_eq!(detail.lines.len(), 1);
        assert_eq!(detail.lines[0].product_id, product_id);
        assert_eq!(detail.lines[0].line_no, 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_lines() {
        let db = test_db().await;
        let (order_id, _) = seed_order(&db).await;

        db.orders().delete(&order_id).await.unwrap();

        assert!(db.orders().get_by_id(&order_id).await.unwrap().is_none());
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_lines")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);

        // The referenced product and customer are untouched
        assert_eq!(db.products().count().await.unwrap(), 1);
        assert_eq!(db.customers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = test_db().await;
        seed_order(&db).await;

        let page = db.orders().list(Page::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data.len(), 1);
    }

    #[tokio::test]
    async fn test_customer_delete_blocked_by_order() {
        let db = test_db().await;
        let (order_id, _) = seed_order(&db).await;

        let detail = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        let err = db
            .customers()
            .delete(&detail.customer.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
