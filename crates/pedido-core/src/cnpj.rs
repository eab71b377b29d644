//! # CNPJ Validation
//!
//! Checksum validation for the customer tax identifier (CNPJ).
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     CNPJ Structure                                  │
//! │                                                                     │
//! │       1 1 . 2 2 2 . 3 3 3 / 0 0 0 1 - 8 1                          │
//! │       └──────────┬──────────┘ └──┬──┘  └┬─┘                        │
//! │            base registration   branch  check digits                │
//! │                                                                     │
//! │  Check digit 1: weighted sum of first 12 digits, modulo 11         │
//! │  Check digit 2: weighted sum of first 13 digits, modulo 11         │
//! │  Remainder < 2 → digit is 0, otherwise digit is 11 - remainder     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the canonical formatted form (`00.000.000/0000-00`) is accepted;
//! the store persists the formatted value and enforces uniqueness on it.

use crate::error::{ValidationError, ValidationResult};

/// Weights for the first check digit (applied to digits 0..12).
const WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Weights for the second check digit (applied to digits 0..13).
const WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Checks whether a string is a structurally valid, checksum-correct CNPJ.
///
/// ## Rules
/// - Must match `00.000.000/0000-00` exactly (digits and punctuation)
/// - All-same-digit values are rejected (e.g., `11.111.111/1111-11`)
/// - Both modulo-11 check digits must match
///
/// ## Example
/// ```rust
/// use pedido_core::cnpj::is_valid_cnpj;
///
/// assert!(is_valid_cnpj("11.222.333/0001-81"));
/// assert!(!is_valid_cnpj("11.222.333/0001-80")); // bad check digit
/// assert!(!is_valid_cnpj("11222333000181"));     // unformatted
/// ```
pub fn is_valid_cnpj(cnpj: &str) -> bool {
    let Some(digits) = parse_formatted(cnpj) else {
        return false;
    };

    // Reject all-same-digit values: they satisfy the checksum but are not
    // real registrations.
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    digits[12] == check_digit(&digits[..12], &WEIGHTS_FIRST)
        && digits[13] == check_digit(&digits[..13], &WEIGHTS_SECOND)
}

/// Validates a CNPJ, returning a structured error on failure.
///
/// ## Example
/// ```rust
/// use pedido_core::cnpj::validate_cnpj;
///
/// assert!(validate_cnpj("11.222.333/0001-81").is_ok());
/// assert!(validate_cnpj("not-a-cnpj").is_err());
/// ```
pub fn validate_cnpj(cnpj: &str) -> ValidationResult<()> {
    if cnpj.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "cnpj".to_string(),
        });
    }

    if !is_valid_cnpj(cnpj) {
        return Err(ValidationError::InvalidFormat {
            field: "cnpj".to_string(),
            reason: "expected 00.000.000/0000-00 with valid check digits".to_string(),
        });
    }

    Ok(())
}

/// Formats a 12-digit base registration into a full CNPJ, computing both
/// check digits. Used for generating seed and test data.
///
/// ## Example
/// ```rust
/// use pedido_core::cnpj::{format_cnpj, is_valid_cnpj};
///
/// let cnpj = format_cnpj([1, 1, 2, 2, 2, 3, 3, 3, 0, 0, 0, 1]);
/// assert_eq!(cnpj, "11.222.333/0001-81");
/// assert!(is_valid_cnpj(&cnpj));
/// ```
pub fn format_cnpj(base: [u32; 12]) -> String {
    let dv1 = check_digit(&base, &WEIGHTS_FIRST);

    let mut thirteen = [0u32; 13];
    thirteen[..12].copy_from_slice(&base);
    thirteen[12] = dv1;
    let dv2 = check_digit(&thirteen, &WEIGHTS_SECOND);

    format!(
        "{}{}.{}{}{}.{}{}{}/{}{}{}{}-{}{}",
        base[0],
        base[1],
        base[2],
        base[3],
        base[4],
        base[5],
        base[6],
        base[7],
        base[8],
        base[9],
        base[10],
        base[11],
        dv1,
        dv2
    )
}

/// Parses the strict `00.000.000/0000-00` layout into its 14 digits.
/// Returns None on any deviation (length, punctuation position, non-digit).
fn parse_formatted(cnpj: &str) -> Option<[u32; 14]> {
    let chars: Vec<char> = cnpj.chars().collect();
    if chars.len() != 18 {
        return None;
    }

    let mut digits = [0u32; 14];
    let mut n = 0;

    for (i, c) in chars.iter().enumerate() {
        match (i, c) {
            (2 | 6, '.') | (10, '/') | (15, '-') => {}
            (_, c) if c.is_ascii_digit() => {
                digits[n] = c.to_digit(10)?;
                n += 1;
            }
            _ => return None,
        }
    }

    (n == 14).then_some(digits)
}

/// Computes a modulo-11 check digit over `digits` with the given weights.
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_cnpjs() {
        assert!(is_valid_cnpj("11.222.333/0001-81"));
        assert!(is_valid_cnpj("11.444.777/0001-61"));
    }

    #[test]
    fn test_rejects_wrong_check_digits() {
        assert!(!is_valid_cnpj("11.222.333/0001-80"));
        assert!(!is_valid_cnpj("11.222.333/0001-18"));
        assert!(!is_valid_cnpj("11.444.777/0001-62"));
    }

    #[test]
    fn test_rejects_all_same_digits() {
        // 11.111.111/1111-11 and friends are checksum-correct but bogus
        for d in 0..=9 {
            let cnpj = format!(
                "{d}{d}.{d}{d}{d}.{d}{d}{d}/{d}{d}{d}{d}-{d}{d}",
                d = d
            );
            assert!(!is_valid_cnpj(&cnpj), "accepted {}", cnpj);
        }
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(!is_valid_cnpj(""));
        assert!(!is_valid_cnpj("11222333000181")); // digits only
        assert!(!is_valid_cnpj("11-222-333/0001.81")); // wrong punctuation
        assert!(!is_valid_cnpj("11.222.333/0001-8")); // too short
        assert!(!is_valid_cnpj("11.222.333/0001-811")); // too long
        assert!(!is_valid_cnpj("aa.bbb.ccc/dddd-ee")); // non-digits
    }

    #[test]
    fn test_format_cnpj_round_trips_through_validator() {
        let cnpj = format_cnpj([1, 1, 4, 4, 4, 7, 7, 7, 0, 0, 0, 1]);
        assert_eq!(cnpj, "11.444.777/0001-61");

        for seq in 1..20u32 {
            let base = [
                1,
                2,
                3,
                4,
                5,
                6,
                7,
                8,
                0,
                0,
                seq / 10,
                seq % 10,
            ];
            assert!(is_valid_cnpj(&format_cnpj(base)));
        }
    }

    #[test]
    fn test_validate_cnpj_errors() {
        assert!(validate_cnpj("11.222.333/0001-81").is_ok());

        let err = validate_cnpj("").unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));

        let err = validate_cnpj("11.222.333/0001-80").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }
}
