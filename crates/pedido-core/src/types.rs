//! # Domain Types
//!
//! Core domain types used throughout the pedido backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────┐     │
//! │  │   Customer    │   │    Product    │   │      Order        │     │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────────  │     │
//! │  │  id (UUID)    │   │  id (UUID)    │   │  id (UUID)        │     │
//! │  │  legal_name   │   │  description  │   │  customer_id (FK) │     │
//! │  │  cnpj         │   │  unit_price   │   │  total_cents      │     │
//! │  │  email        │   │  stock        │   │  created_at       │     │
//! │  └───────────────┘   └───────────────┘   └─────────┬─────────┘     │
//! │                                                    │ 1..n          │
//! │                                          ┌─────────▼─────────┐     │
//! │                                          │    OrderLine      │     │
//! │                                          │  ───────────────  │     │
//! │                                          │  product_id (FK)  │     │
//! │                                          │  quantity         │     │
//! │                                          │  unit_price (at   │     │
//! │                                          │   order time)     │     │
//! │                                          │  subtotal         │     │
//! │                                          └───────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `OrderLine` freezes the unit price and the product description at order
//! time. Later product edits never change an already-committed order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A registered customer that orders can be placed for.
///
/// Customers are created and edited by the CRUD side; the placement engine
/// only ever reads them (existence lookup).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Registered legal/display name.
    pub legal_name: String,

    /// Tax identifier in `00.000.000/0000-00` format, checksum-validated.
    /// Unique across customers.
    pub cnpj: String,

    /// Contact email.
    pub email: String,

    /// When the customer was created.
    pub created_at: DateTime<Utc>,

    /// When the customer was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for ordering.
///
/// Stock is the only field the placement engine mutates; everything else
/// belongs to the CRUD side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable description shown on order lines.
    pub description: String,

    /// Unit sale price in cents (smallest currency unit). Never negative.
    pub unit_price_cents: i64,

    /// Current stock level. Never negative, including under concurrency.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit sale price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Checks whether the requested quantity can be served from stock.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order header.
///
/// Immutable after creation: no operation updates an existing order's lines
/// or total. `total_cents` always equals the sum of its line subtotals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,

    /// Reference to the customer the order was placed for.
    pub customer_id: String,

    /// Order total in cents: Σ line.subtotal_cents.
    pub total_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line in an order.
/// Uses the snapshot pattern to freeze product data at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,

    /// Position within the order, starting at 1. Lines replicate the input
    /// order of the placement request.
    pub line_no: i64,

    pub product_id: String,

    /// Product description at order time (frozen).
    pub description_snapshot: String,

    /// Quantity ordered (always >= 1).
    pub quantity: i64,

    /// Unit price in cents at order time (frozen). Independent of later
    /// product price changes.
    pub unit_price_cents: i64,

    /// Line subtotal: quantity × captured unit price.
    pub subtotal_cents: i64,
}

impl OrderLine {
    /// Returns the captured unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Order Detail (hydrated aggregate)
// =============================================================================

/// A fully hydrated order: header, resolved customer, and all lines in
/// their original input order.
///
/// This is what the placement engine returns and what the read side serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
}

// =============================================================================
// Placement Request
// =============================================================================

/// One requested line of a placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,

    /// Requested quantity, must be >= 1.
    pub quantity: i64,
}

/// Input to the order placement engine.
///
/// Lines are processed in the given order; the same product may appear more
/// than once, in which case later lines see earlier lines' stock decrements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: String,
    pub lines: Vec<OrderLineRequest>,
}

// =============================================================================
// Pagination
// =============================================================================

/// A page request for listing endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub page: u32,

    /// Maximum records per page.
    pub limit: u32,
}

impl Page {
    pub fn new(page: u32, limit: u32) -> Self {
        Page {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Number of records to skip.
    ///
    /// Tolerates a literal-built `Page` with `page: 0`; page 0 and page 1
    /// both start at the first record.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1) * self.limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Page { page: 1, limit: 10 }
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    /// Builds one result page. A zero limit from a literal-built `Page` is
    /// treated as 1 so the page count stays defined.
    pub fn new(data: Vec<T>, total: i64, page: Page) -> Self {
        let limit = page.limit.max(1) as i64;
        Paginated {
            data,
            total,
            page: page.page.max(1),
            limit: page.limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_product(stock: i64) -> Product {
        Product {
            id: "p1".to_string(),
            description: "Widget".to_string(),
            unit_price_cents: 1999,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_has_stock() {
        let product = test_product(10);
        assert!(product.has_stock(10));
        assert!(product.has_stock(3));
        assert!(!product.has_stock(11));
    }

    #[test]
    fn test_product_unit_price() {
        let product = test_product(10);
        assert_eq!(product.unit_price().cents(), 1999);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(1, 10).offset(), 0);
        assert_eq!(Page::new(3, 10).offset(), 20);

        // Out-of-range inputs are clamped, never panic
        let clamped = Page::new(0, 0);
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.limit, 1);
    }

    #[test]
    fn test_literal_zero_page_does_not_panic() {
        // Fields are public, so a Page can be built without new()'s clamps
        let raw = Page { page: 0, limit: 0 };
        assert_eq!(raw.offset(), 0);

        let result: Paginated<i64> = Paginated::new(vec![], 5, raw);
        assert_eq!(result.page, 1);
        assert_eq!(result.total_pages, 5);
    }

    #[test]
    fn test_paginated_total_pages_is_ceiling() {
        let result: Paginated<i64> = Paginated::new(vec![], 25, Page::new(1, 10));
        assert_eq!(result.total_pages, 3);

        let exact: Paginated<i64> = Paginated::new(vec![], 30, Page::new(1, 10));
        assert_eq!(exact.total_pages, 3);

        let empty: Paginated<i64> = Paginated::new(vec![], 0, Page::new(1, 10));
        assert_eq!(empty.total_pages, 0);
    }
}
