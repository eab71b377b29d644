//! # Repository Layer
//!
//! Data access repositories for each aggregate.
//!
//! ## Pattern
//! Each repository wraps the shared `SqlitePool` and exposes typed CRUD
//! operations returning `DbResult<T>`. Cross-aggregate transactional work
//! (order placement) lives in [`crate::placement`], which borrows the
//! connection-level helpers the repositories expose.

pub mod customer;
pub mod order;
pub mod product;

pub use customer::CustomerRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
