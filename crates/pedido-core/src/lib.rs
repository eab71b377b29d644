//! # pedido-core: Pure Business Logic for the Pedido Backend
//!
//! This crate is the I/O-free heart of the order-management backend. It
//! defines the domain types, the fixed-point money representation, and the
//! validation rules that run before anything touches the database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Pedido Data Flow                               │
//! │                                                                     │
//! │  Upstream request layer (out of scope)                             │
//! │       │                                                             │
//! │  ┌────▼────────────────────────────────────────────────────────┐   │
//! │  │              ★ pedido-core (THIS CRATE) ★                   │   │
//! │  │                                                             │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐    │   │
//! │  │   │  types  │  │  money  │  │  cnpj   │  │ validation │    │   │
//! │  │   │ Customer│  │  Money  │  │ digits  │  │   rules    │    │   │
//! │  │   │ Product │  │  cents  │  │ format  │  │   checks   │    │   │
//! │  │   │  Order  │  └─────────┘  └─────────┘  └────────────┘    │   │
//! │  │   └─────────┘                                               │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS       │   │
//! │  └────┬────────────────────────────────────────────────────────┘   │
//! │       │                                                             │
//! │  ┌────▼────────────────────────────────────────────────────────┐   │
//! │  │                 pedido-db (Database Layer)                  │   │
//! │  │         SQLite repositories + order placement engine        │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Product, Order, OrderLine, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cnpj`] - Tax-identifier checksum validation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cnpj;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cnpj::{format_cnpj, is_valid_cnpj, validate_cnpj};
pub use error::{ValidationError, ValidationResult};
pub use money::Money;
pub use types::*;
pub use validation::validate_place_order;
