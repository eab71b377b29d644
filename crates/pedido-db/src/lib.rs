//! # pedido-db: Database Layer for the Pedido Backend
//!
//! This crate owns all SQLite storage: connection pooling, embedded
//! migrations, repositories for each aggregate, and the transactional order
//! placement engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Pedido Data Flow                               │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                pedido-core (Business Logic)                 │   │
//! │  │          Domain types • Money • CNPJ • Validation           │   │
//! │  └────┬────────────────────────────────────────────────────────┘   │
//! │       │ types flow down                                            │
//! │  ┌────▼────────────────────────────────────────────────────────┐   │
//! │  │              ★ pedido-db (THIS CRATE) ★                     │   │
//! │  │                                                             │   │
//! │  │   ┌──────┐ ┌────────────┐ ┌──────────────┐ ┌────────────┐  │   │
//! │  │   │ pool │ │ migrations │ │ repositories │ │ placement  │  │   │
//! │  │   │ WAL  │ │  embedded  │ │ customer     │ │  engine    │  │   │
//! │  │   │ cfg  │ │  SQL files │ │ product      │ │  (atomic)  │  │   │
//! │  │   └──────┘ └────────────┘ │ order        │ └────────────┘  │   │
//! │  │                           └──────────────┘                  │   │
//! │  └────┬────────────────────────────────────────────────────────┘   │
//! │       │                                                             │
//! │  ┌────▼────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite (WAL mode)                       │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool management ([`Database`], [`DbConfig`])
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - [`DbError`] taxonomy and sqlx error mapping
//! - [`repository`] - Per-aggregate data access
//! - [`placement`] - Atomic order placement engine
//!
//! ## Usage
//! ```rust,ignore
//! use pedido_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./pedido.db")).await?;
//! let placed = db.placement().place_order(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod placement;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{DbError, DbResult};
pub use placement::{OrderPlacementEngine, PlaceOrderError};
pub use pool::{Database, DbConfig};
pub use repository::{CustomerRepository, OrderRepository, ProductRepository};
