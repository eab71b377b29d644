//! # Order Placement Engine
//!
//! Atomic order placement: validate, reserve stock, snapshot prices, and
//! persist the order aggregate in one database transaction.
//!
//! ## Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      place_order(request)                           │
//! │                                                                     │
//! │  1. Structural validation          ── InvalidRequest, no I/O       │
//! │  2. BEGIN TRANSACTION                                               │
//! │  3. Fetch customer                 ── CustomerNotFound             │
//! │  4. For each line (input order):                                    │
//! │       fetch product                ── ProductNotFound              │
//! │       stock >= quantity?           ── InsufficientStock            │
//! │       guarded stock decrement      ── ConcurrentModification      │
//! │       snapshot price + description                                  │
//! │       subtotal = price × quantity  (integer cents)                 │
//! │  5. Insert header + lines                                           │
//! │  6. COMMIT                         ── busy → ConcurrentModification│
//! │                                                                     │
//! │  Any failure before commit aborts wholesale: no stock decrement    │
//! │  and no order row survives a failed placement.                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Duplicate Lines
//! The same product may appear on several lines. Each line re-reads the
//! product on the transaction's own connection, so it observes the
//! decrements of earlier lines and the availability check compounds
//! correctly.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::customer::CustomerRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use pedido_core::{
    validate_place_order, Money, Order, OrderDetail, OrderLine, PlaceOrderRequest,
    ValidationError,
};

// =============================================================================
// Error Taxonomy
// =============================================================================

/// Classified order placement failures.
///
/// Every failure mode carries enough detail for the caller to act without
/// parsing messages, and maps to a stable machine-readable code.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The referenced customer does not exist.
    #[error("customer not found: {0}")]
    CustomerNotFound(String),

    /// A referenced product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// A line asked for more than the product has in stock.
    ///
    /// `available` is the stock level observed inside the placement
    /// transaction, after any earlier lines for the same product.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// The request failed structural validation; nothing was attempted
    /// against the store.
    #[error("invalid request: {0:?}")]
    InvalidRequest(Vec<ValidationError>),

    /// A concurrent writer invalidated this placement. Safe to retry with
    /// the same input.
    #[error("concurrent modification, retry the placement")]
    ConcurrentModification,

    /// The store itself failed.
    #[error("storage fault: {0}")]
    Storage(DbError),
}

impl PlaceOrderError {
    /// Stable machine-readable code for each failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            PlaceOrderError::CustomerNotFound(_) => "customer_not_found",
            PlaceOrderError::ProductNotFound(_) => "product_not_found",
            PlaceOrderError::InsufficientStock { .. } => "insufficient_stock",
            PlaceOrderError::InvalidRequest(_) => "invalid_request",
            PlaceOrderError::ConcurrentModification => "concurrent_modification",
            PlaceOrderError::Storage(_) => "storage_fault",
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Only conflict losses are retryable; every other kind will fail the
    /// same way until the world changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlaceOrderError::ConcurrentModification)
    }
}

impl From<DbError> for PlaceOrderError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict { .. } => PlaceOrderError::ConcurrentModification,
            other => PlaceOrderError::Storage(other),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The order placement engine.
///
/// ## Usage
/// ```rust,ignore
/// let engine = db.placement();
/// let placed = engine.place_order(&request).await?;
/// println!("order {} total {}", placed.order.id, placed.order.total());
/// ```
#[derive(Debug, Clone)]
pub struct OrderPlacementEngine {
    pool: SqlitePool,
}

impl OrderPlacementEngine {
    /// Creates a new OrderPlacementEngine.
    pub fn new(pool: SqlitePool) -> Self {
        OrderPlacementEngine { pool }
    }

    /// Places an order atomically.
    ///
    /// Either every effect happens (stock decremented for every line,
    /// header and lines persisted, total = Σ subtotals) or none do. The
    /// returned [`OrderDetail`] carries the captured prices, which later
    /// product edits never change.
    ///
    /// Dropping the returned future before completion rolls the open
    /// transaction back; a placement never half-applies.
    pub async fn place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> Result<OrderDetail, PlaceOrderError> {
        // Step 1: structural validation, before any I/O
        validate_place_order(request).map_err(PlaceOrderError::InvalidRequest)?;

        // Step 2: one transaction for the entire placement
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Step 3: the customer must exist
        let customer = CustomerRepository::get_on_conn(&mut tx, &request.customer_id)
            .await?
            .ok_or_else(|| PlaceOrderError::CustomerNotFound(request.customer_id.clone()))?;

        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        // Step 4: reserve stock and snapshot prices, in input order
        let mut lines = Vec::with_capacity(request.lines.len());
        let mut total = Money::zero();

        for (idx, line) in request.lines.iter().enumerate() {
            let product = ProductRepository::get_on_conn(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| PlaceOrderError::ProductNotFound(line.product_id.clone()))?;

            if !product.has_stock(line.quantity) {
                debug!(
                    product_id = %product.id,
                    available = product.stock,
                    requested = line.quantity,
                    "Rejecting placement: insufficient stock"
                );
                return Err(PlaceOrderError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock,
                    requested: line.quantity,
                });
            }

            ProductRepository::apply_stock_delta(&mut tx, &product.id, -line.quantity).await?;

            let unit_price = product.unit_price();
            let subtotal = unit_price.multiply_quantity(line.quantity);
            total += subtotal;

            lines.push(OrderLine {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                line_no: (idx + 1) as i64,
                product_id: product.id,
                description_snapshot: product.description,
                quantity: line.quantity,
                unit_price_cents: unit_price.cents(),
                subtotal_cents: subtotal.cents(),
            });
        }

        let order = Order {
            id: order_id,
            customer_id: customer.id.clone(),
            total_cents: total.cents(),
            created_at: now,
            updated_at: now,
        };

        // Step 5: persist the aggregate on the same transaction
        OrderRepository::save_order(&mut tx, &order, &lines).await?;

        // Step 6: commit; a busy database here surfaces as a retryable
        // conflict like any mid-flight one
        tx.commit().await.map_err(DbError::from)?;

        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            lines = lines.len(),
            total_cents = order.total_cents,
            "Order placed"
        );

        Ok(OrderDetail {
            order,
            customer,
            lines,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use pedido_core::{OrderLineRequest, Page};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database) -> String {
        db.customers()
            .create("Acme Ltda", "11.222.333/0001-81", "billing@acme.example")
            .await
            .unwrap()
            .id
    }

    fn request(customer_id: &str, lines: Vec<(String, i64)>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            customer_id: customer_id.to_string(),
            lines: lines
                .into_iter()
                .map(|(product_id, quantity)| OrderLineRequest {
                    product_id,
                    quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_happy_path_decrements_stock_and_totals() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let product = db.products().create("Widget", 1999, 10).await.unwrap();

        let placed = db
            .placement()
            .place_order(&request(&customer_id, vec![(product.id.clone(), 3)]))
            .await
            .unwrap();

        assert_eq!(placed.order.total_cents, 5997);
        assert_eq!(placed.lines.len(), 1);
        assert_eq!(placed.lines[0].unit_price_cents, 1999);
        assert_eq!(placed.lines[0].subtotal_cents, 5997);
        assert_eq!(placed.customer.id, customer_id);

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 7);

        // The committed order is readable and identical
        let detail = db
            .orders()
            .get_by_id(&placed.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.order.total_cents, 5997);
        assert_eq!(detail.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let product = db.products().create("Widget", 1999, 2).await.unwrap();

        let err = db
            .placement()
            .place_order(&request(&customer_id, vec![(product.id.clone(), 5)]))
            .await
            .unwrap_err();

        match err {
            PlaceOrderError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, product.id);
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 2);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_rejected_before_stock_moves() {
        let db = test_db().await;
        let product = db.products().create("Widget", 1999, 10).await.unwrap();

        let err = db
            .placement()
            .place_order(&request(
                &Uuid::new_v4().to_string(),
                vec![(product.id.clone(), 1)],
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, PlaceOrderError::CustomerNotFound(_)));
        assert_eq!(err.code(), "customer_not_found");

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 10);
    }

    #[tokio::test]
    async fn test_duplicate_lines_compound_decrements() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let product = db.products().create("Widget", 500, 5).await.unwrap();

        let placed = db
            .placement()
            .place_order(&request(
                &customer_id,
                vec![(product.id.clone(), 2), (product.id.clone(), 2)],
            ))
            .await
            .unwrap();

        assert_eq!(placed.lines.len(), 2);
        assert_eq!(placed.lines[0].line_no, 1);
        assert_eq!(placed.lines[1].line_no, 2);
        assert_eq!(placed.order.total_cents, 2000);

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 1);
    }

    #[tokio::test]
    async fn test_duplicate_lines_overcommit_rejected() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let product = db.products().create("Widget", 500, 5).await.unwrap();

        // 3 + 3 exceeds stock even though each line alone fits
        let err = db
            .placement()
            .place_order(&request(
                &customer_id,
                vec![(product.id.clone(), 3), (product.id.clone(), 3)],
            ))
            .await
            .unwrap_err();

        match err {
            PlaceOrderError::InsufficientStock { available, .. } => assert_eq!(available, 2),
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // The first line's decrement rolled back with the transaction
        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 5);
    }

    #[tokio::test]
    async fn test_atomicity_on_unknown_product() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let good = db.products().create("Widget", 1999, 10).await.unwrap();

        let err = db
            .placement()
            .place_order(&request(
                &customer_id,
                vec![(good.id.clone(), 2), (Uuid::new_v4().to_string(), 1)],
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, PlaceOrderError::ProductNotFound(_)));

        // Line 1's decrement must not survive line 2's failure
        let after = db.products().get_by_id(&good.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 10);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_product_edit() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let product = db.products().create("Widget", 1999, 10).await.unwrap();

        let placed = db
            .placement()
            .place_order(&request(&customer_id, vec![(product.id.clone(), 1)]))
            .await
            .unwrap();

        db.products()
            .update(&product.id, "Widget (new)", 2999)
            .await
            .unwrap();

        let detail = db
            .orders()
            .get_by_id(&placed.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.lines[0].unit_price_cents, 1999);
        assert_eq!(detail.lines[0].description_snapshot, "Widget");
        assert_eq!(detail.order.total_cents, 1999);
    }

    #[tokio::test]
    async fn test_validation_rejected_without_touching_store() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let product = db.products().create("Widget", 1999, 10).await.unwrap();

        // Zero quantity and an empty line list are both structural errors
        let err = db
            .placement()
            .place_order(&request(&customer_id, vec![(product.id.clone(), 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaceOrderError::InvalidRequest(_)));
        assert_eq!(err.code(), "invalid_request");
        assert!(!err.is_retryable());

        let err = db
            .placement()
            .place_order(&request(&customer_id, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaceOrderError::InvalidRequest(_)));

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 10);
    }

    #[tokio::test]
    async fn test_concurrent_placements_never_oversell() {
        // Single shared in-memory database; both placements race for the
        // same 10 units with 6 requested each.
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let product = db.products().create("Widget", 1000, 10).await.unwrap();

        let engine_a = db.placement();
        let engine_b = db.placement();
        let req_a = request(&customer_id, vec![(product.id.clone(), 6)]);
        let req_b = request(&customer_id, vec![(product.id.clone(), 6)]);

        let (res_a, res_b) =
            tokio::join!(engine_a.place_order(&req_a), engine_b.place_order(&req_b));

        let successes = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one placement must win");

        for result in [res_a, res_b] {
            if let Err(err) = result {
                // The loser fails cleanly with a classified error
                assert!(
                    matches!(
                        err,
                        PlaceOrderError::InsufficientStock { .. }
                            | PlaceOrderError::ConcurrentModification
                    ),
                    "unexpected loser error: {err:?}"
                );
            }
        }

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 4);
        assert_eq!(db.orders().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_contending_writers_on_shared_file_database() {
        // A file-backed database with several pool connections lets both
        // placements open their transaction before either commits, so the
        // loser can hit the busy/stale-snapshot path instead of reading
        // the winner's committed decrement.
        let path = std::env::temp_dir().join(format!("pedido-race-{}.db", Uuid::new_v4()));
        let config = DbConfig::new(&path).max_connections(4);
        let db = Database::new(config).await.unwrap();

        let customer_id = seed_customer(&db).await;
        let product = db.products().create("Widget", 1000, 10).await.unwrap();

        let engine_a = db.placement();
        let engine_b = db.placement();
        let req_a = request(&customer_id, vec![(product.id.clone(), 6)]);
        let req_b = request(&customer_id, vec![(product.id.clone(), 6)]);

        let (res_a, res_b) =
            tokio::join!(engine_a.place_order(&req_a), engine_b.place_order(&req_b));

        let successes = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one placement must win");

        for result in [res_a, res_b] {
            if let Err(err) = result {
                assert!(
                    matches!(
                        err,
                        PlaceOrderError::InsufficientStock { .. }
                            | PlaceOrderError::ConcurrentModification
                    ),
                    "unexpected loser error: {err:?}"
                );
                assert!(err.code() == "insufficient_stock" || err.is_retryable());
            }
        }

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 4);
        assert_eq!(db.orders().count().await.unwrap(), 1);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    #[tokio::test]
    async fn test_large_quantity_accepted_when_stock_covers_it() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let product = db.products().create("Widget", 250, 5000).await.unwrap();

        let placed = db
            .placement()
            .place_order(&request(&customer_id, vec![(product.id.clone(), 1000)]))
            .await
            .unwrap();

        assert_eq!(placed.lines[0].quantity, 1000);
        assert_eq!(placed.order.total_cents, 250_000);

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 4000);
    }

    #[tokio::test]
    async fn test_multi_product_order() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let p1 = db.products().create("Widget", 1999, 10).await.unwrap();
        let p2 = db.products().create("Gadget", 550, 4).await.unwrap();

        let placed = db
            .placement()
            .place_order(&request(
                &customer_id,
                vec![(p1.id.clone(), 2), (p2.id.clone(), 3)],
            ))
            .await
            .unwrap();

        // 2×1999 + 3×550 = 3998 + 1650
        assert_eq!(placed.order.total_cents, 5648);
        assert_eq!(placed.lines[0].subtotal_cents, 3998);
        assert_eq!(placed.lines[1].subtotal_cents, 1650);

        let orders = db.orders().list(Page::default()).await.unwrap();
        assert_eq!(orders.total, 1);
        assert_eq!(orders.data[0].lines.len(), 2);
    }

    #[tokio::test]
    async fn test_storage_fault_code() {
        let err = PlaceOrderError::from(DbError::ConnectionFailed("down".to_string()));
        assert_eq!(err.code(), "storage_fault");
        assert!(!err.is_retryable());

        let conflict = PlaceOrderError::from(DbError::conflict("database is locked"));
        assert_eq!(conflict.code(), "concurrent_modification");
        assert!(conflict.is_retryable());
    }
}
