//! # Error Types
//!
//! Domain-level error types for pedido-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  pedido-core errors (this file)                                    │
//! │  └── ValidationError  - Input validation failures                  │
//! │                                                                     │
//! │  pedido-db errors (separate crate)                                 │
//! │  ├── DbError          - Database operation failures                │
//! │  └── PlaceOrderError  - Classified placement failures              │
//! │                                                                     │
//! │  Flow: ValidationError → PlaceOrderError → upstream status code    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, limits)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a payload does not meet requirements. Validation runs
/// as an explicit pass before business logic, producing the full list of
/// problems rather than stopping at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be a positive integer.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed UUID, malformed CNPJ).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "legal_name".to_string(),
        };
        assert_eq!(err.to_string(), "legal_name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");

        let err = ValidationError::InvalidFormat {
            field: "cnpj".to_string(),
            reason: "expected 00.000.000/0000-00".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cnpj has invalid format: expected 00.000.000/0000-00"
        );
    }
}
