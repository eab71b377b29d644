//! # Validation Module
//!
//! Input validation for the pedido backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Upstream request layer (out of scope)                    │
//! │  └── Shape/type checks during deserialization                      │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE                                              │
//! │  └── Explicit rule pass producing a structured error list          │
//! │      before the placement engine or any repository runs            │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                        │
//! │  ├── NOT NULL / CHECK constraints                                  │
//! │  ├── UNIQUE constraints (cnpj)                                     │
//! │  └── Foreign key constraints                                       │
//! │                                                                     │
//! │  The database layer is a backstop, never the primary mechanism.    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pedido_core::validation::{validate_quantity, validate_place_order};
//! use pedido_core::types::{PlaceOrderRequest, OrderLineRequest};
//!
//! validate_quantity(5).unwrap();
//!
//! let request = PlaceOrderRequest {
//!     customer_id: "not-a-uuid".to_string(),
//!     lines: vec![],
//! };
//! let errors = validate_place_order(&request).unwrap_err();
//! assert_eq!(errors.len(), 2); // bad id AND empty lines, both reported
//! ```

use uuid::Uuid;

use crate::error::{ValidationError, ValidationResult};
use crate::types::PlaceOrderRequest;
use crate::cnpj;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an entity identifier (UUID v4 string form).
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if Uuid::parse_str(id).is_err() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a UUID".to_string(),
        });
    }

    Ok(())
}

/// Validates a line quantity (must be at least 1).
///
/// Whether the quantity can actually be served is a stock question, decided
/// inside the placement transaction, not here.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a customer legal name.
pub fn validate_legal_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "legal_name".to_string(),
        });
    }

    if name.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "legal_name".to_string(),
            max: 255,
        });
    }

    Ok(())
}

/// Validates a contact email. Deliberately shallow: one `@` with characters
/// on both sides. Deliverability is not this layer's problem.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 255,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    Ok(())
}

/// Validates a product description.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 255,
        });
    }

    Ok(())
}

/// Validates a unit sale price in cents (must not be negative).
pub fn validate_unit_price(unit_price_cents: i64) -> ValidationResult<()> {
    if unit_price_cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unit_price_cents".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level (must not be negative).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates a customer payload (create/update), collecting all problems.
pub fn validate_customer_payload(
    legal_name: &str,
    cnpj_value: &str,
    email: &str,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_legal_name(legal_name) {
        errors.push(e);
    }
    if let Err(e) = cnpj::validate_cnpj(cnpj_value) {
        errors.push(e);
    }
    if let Err(e) = validate_email(email) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a product payload (create/update), collecting all problems.
pub fn validate_product_payload(
    description: &str,
    unit_price_cents: i64,
    stock: i64,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_description(description) {
        errors.push(e);
    }
    if let Err(e) = validate_unit_price(unit_price_cents) {
        errors.push(e);
    }
    if let Err(e) = validate_stock(stock) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a placement request before the engine touches the store.
///
/// Collects every problem instead of stopping at the first: empty line
/// collections, malformed identifiers, and non-positive quantities are all
/// reported together.
pub fn validate_place_order(request: &PlaceOrderRequest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_id("customer_id", &request.customer_id) {
        errors.push(e);
    }

    if request.lines.is_empty() {
        errors.push(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    for line in &request.lines {
        if let Err(e) = validate_id("product_id", &line.product_id) {
            errors.push(e);
        }
        if let Err(e) = validate_quantity(line.quantity) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderLineRequest;

    fn uuid() -> String {
        Uuid::new_v4().to_string()
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("customer_id", &uuid()).is_ok());
        assert!(validate_id("customer_id", "").is_err());
        assert!(validate_id("customer_id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        // Large quantities are legal here; stock decides feasibility
        assert!(validate_quantity(1000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("faturamento@empresa.com.br").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("sem-arroba").is_err());
        assert!(validate_email("@dominio.com").is_err());
        assert!(validate_email("nome@semponto").is_err());
    }

    #[test]
    fn test_validate_customer_payload_collects_all_errors() {
        let errors =
            validate_customer_payload("", "invalid", "bad-email").unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_validate_product_payload() {
        assert!(validate_product_payload("Parafuso M8", 150, 500).is_ok());

        let errors = validate_product_payload("", -1, -1).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_validate_place_order_happy_path() {
        let request = PlaceOrderRequest {
            customer_id: uuid(),
            lines: vec![
                OrderLineRequest {
                    product_id: uuid(),
                    quantity: 2,
                },
                OrderLineRequest {
                    product_id: uuid(),
                    quantity: 1,
                },
            ],
        };
        assert!(validate_place_order(&request).is_ok());
    }

    #[test]
    fn test_validate_place_order_rejects_empty_lines() {
        let request = PlaceOrderRequest {
            customer_id: uuid(),
            lines: vec![],
        };
        let errors = validate_place_order(&request).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Required { field } if field == "lines")));
    }

    #[test]
    fn test_validate_place_order_reports_every_bad_line() {
        let request = PlaceOrderRequest {
            customer_id: "nope".to_string(),
            lines: vec![
                OrderLineRequest {
                    product_id: "also-nope".to_string(),
                    quantity: 0,
                },
                OrderLineRequest {
                    product_id: uuid(),
                    quantity: -1,
                },
            ],
        };
        let errors = validate_place_order(&request).unwrap_err();
        // bad customer id, bad product id, two bad quantities
        assert_eq!(errors.len(), 4);
    }
}
