//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                │
//! │                                                                     │
//! │  SQLite Error (sqlx::Error)                                        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  DbError (this module) ← Adds context and categorization           │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  PlaceOrderError (placement engine) ← Classified failure taxonomy  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Upstream layer maps each kind to a distinct, stable status        │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use pedido_core::ValidationError;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and caller-side classification.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (e.g., duplicate CNPJ).
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Input rejected by the explicit validation pass.
    ///
    /// ## When This Occurs
    /// - Malformed CNPJ, bad email, empty names on customer writes
    /// - Negative prices or stock on product writes
    ///
    /// Raised before any SQL runs: the schema's CHECK constraints stay a
    /// concurrency backstop, never the primary input filter.
    #[error("invalid input: {0:?}")]
    Validation(Vec<ValidationError>),

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent customer_id/product_id
    /// - Deleting a product or customer still referenced by an order
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Write conflict detected by the store.
    ///
    /// ## When This Occurs
    /// - A guarded conditional write (stock decrement) affected zero rows
    ///   because the read snapshot is stale
    /// - SQLITE_BUSY/SQLITE_LOCKED while another writer holds the database
    /// - A CHECK constraint fired as the last-resort backstop
    ///
    /// The unit of work must be aborted wholesale; callers may retry.
    #[error("write conflict: {message}")]
    Conflict { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        DbError::Conflict {
            message: message.into(),
        }
    }

    /// Whether this failure may succeed on a clean retry of the
    /// enclosing unit of work.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Conflict { .. } | DbError::PoolExhausted)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound     → DbError::NotFound
/// sqlx::Error::Database        → Analyze message for constraint/busy kind
/// sqlx::Error::PoolTimedOut    → DbError::PoolExhausted
/// Other                        → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint/busy messages:
                //   UNIQUE constraint:  "UNIQUE constraint failed: <table>.<column>"
                //   FK constraint:      "FOREIGN KEY constraint failed"
                //   CHECK constraint:   "CHECK constraint failed: <detail>"
                //   Busy writer:        "database is locked" / "database table is locked"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed")
                    || msg.contains("database is locked")
                    || msg.contains("database table is locked")
                {
                    DbError::Conflict {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Customer", "abc");
        assert_eq!(err.to_string(), "Customer not found: abc");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(DbError::conflict("database is locked").is_retryable());
        assert!(DbError::PoolExhausted.is_retryable());
        assert!(!DbError::not_found("Product", "x").is_retryable());
        assert!(!DbError::duplicate("cnpj", "y").is_retryable());
        assert!(!DbError::Validation(vec![]).is_retryable());
    }
}
