//! # Validation Module
//!
//! Input validation for the marketplace.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  └── Shape: types, uuids, payment type codes                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── CPF checksum                                                      │
//! │  └── Contact and vehicle field rules                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (vin, plate, document, employee code)                      │
//! │  └── Foreign keys, status CHECK constraints                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## CPF Check Digits
//! ```text
//!   5 2 9 9 8 2 2 4 7 │ 2 5
//!   ───────────────── │ ───
//!   ×10 … ×2  → sum%11 = r  →  d1 = r<2 ? 0 : 11-r
//!   ×11 … ×2 (incl d1)      →  d2 = same rule
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identity Document (CPF)
// =============================================================================

/// Strips everything that is not an ASCII digit.
///
/// ## Example
/// ```rust
/// use motorhub_core::validation::normalize_document;
///
/// assert_eq!(normalize_document("529.982.247-25"), "52998224725");
/// assert_eq!(normalize_document("abc"), "");
/// ```
pub fn normalize_document(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Checks a CPF: eleven digits after normalization, not all identical, and
/// both check digits correct.
///
/// ## Example
/// ```rust
/// use motorhub_core::validation::is_valid_document;
///
/// assert!(is_valid_document("111.444.777-35"));
/// assert!(!is_valid_document("111.111.111-11"));
/// assert!(!is_valid_document("12345678901"));
/// ```
pub fn is_valid_document(raw: &str) -> bool {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 11 {
        return false;
    }

    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Next check digit for a prefix of 9 or 10 digits.
fn check_digit(prefix: &[u32]) -> u32 {
    let top = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();

    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

/// Validates and normalizes the buyer's CPF.
///
/// Fails with field `CustomerCpf` and message `Invalid CPF format`.
pub fn validate_document(raw: &str) -> ValidationResult<String> {
    if !is_valid_document(raw) {
        return Err(ValidationError::rejected("CustomerCpf", "Invalid CPF format"));
    }
    Ok(normalize_document(raw))
}

// =============================================================================
// Contact Fields
// =============================================================================

/// Validates an optional customer name: 2-100 characters after trimming.
///
/// Blank input is treated as absent. Returns the trimmed value.
pub fn validate_customer_name(name: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(name) = non_blank(name) else {
        return Ok(None);
    };

    let len = name.chars().count();
    if len < 2 {
        return Err(ValidationError::TooShort {
            field: "CustomerName".to_string(),
            min: 2,
        });
    }
    if len > 100 {
        return Err(ValidationError::TooLong {
            field: "CustomerName".to_string(),
            max: 100,
        });
    }

    Ok(Some(name.to_string()))
}

/// Validates an optional customer email.
///
/// At most 100 characters, exactly one `@`, non-empty local part, dotted
/// domain. Blank input is treated as absent.
pub fn validate_customer_email(email: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(email) = non_blank(email) else {
        return Ok(None);
    };

    if email.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "CustomerEmail".to_string(),
            max: 100,
        });
    }

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "CustomerEmail".to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    Ok(Some(email.to_string()))
}

/// Validates an optional customer phone: at most 20 characters of digits,
/// spaces and `+-()`. Blank input is treated as absent.
pub fn validate_customer_phone(phone: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(phone) = non_blank(phone) else {
        return Ok(None);
    };

    if phone.chars().count() > 20 {
        return Err(ValidationError::TooLong {
            field: "CustomerPhone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "CustomerPhone".to_string(),
            reason: "must contain only digits, spaces and + - ( )".to_string(),
        });
    }

    Ok(Some(phone.to_string()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Vehicle Fields
// =============================================================================

/// Validates a required identifier-like text field (VIN, plate).
///
/// Returns the trimmed value.
pub fn validate_identifier(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates vehicle prices: both positive, sale above purchase.
pub fn validate_prices(purchase_price_cents: i64, sale_price_cents: i64) -> ValidationResult<()> {
    if purchase_price_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "purchasePriceCents".to_string(),
        });
    }

    if sale_price_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "salePriceCents".to_string(),
        });
    }

    if sale_price_cents <= purchase_price_cents {
        return Err(ValidationError::rejected(
            "salePriceCents",
            "Sale price must be greater than purchase price",
        ));
    }

    Ok(())
}

/// Validates a mileage reading (non-negative).
pub fn validate_mileage(mileage: i64) -> ValidationResult<()> {
    if mileage < 0 {
        return Err(ValidationError::rejected(
            "mileage",
            "Mileage cannot be negative",
        ));
    }
    Ok(())
}

/// Validates a webhook transaction id: present, at most 100 characters.
pub fn validate_transaction_id(transaction_id: &str) -> ValidationResult<()> {
    validate_identifier("TransactionId", transaction_id, 100).map(|_| ())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_documents() {
        assert!(is_valid_document("529.982.247-25"));
        assert!(is_valid_document("52998224725"));
        assert!(is_valid_document("111.444.777-35"));
        assert!(is_valid_document(" 111 444 777 35 "));
    }

    #[test]
    fn test_invalid_documents() {
        // wrong second check digit
        assert!(!is_valid_document("12345678901"));
        assert!(!is_valid_document("529.982.247-26"));
        assert!(!is_valid_document("000.000.000-00"));
        assert!(!is_valid_document("99999999999"));
        assert!(!is_valid_document("5299822472"));
        assert!(!is_valid_document("529982247250"));
        assert!(!is_valid_document(""));
        assert!(!is_valid_document("not a document"));
    }

    #[test]
    fn test_repeated_digits_are_rejected() {
        // 000.000.000-00 and 111.111.111-11 pass the checksum but are not issued
        for d in 0..=9 {
            let repeated = d.to_string().repeat(11);
            assert!(!is_valid_document(&repeated), "{repeated}");
        }
    }

    #[test]
    fn test_normalize_document() {
        assert_eq!(normalize_document("111.444.777-35"), "11144477735");
        assert_eq!(normalize_document("11144477735"), "11144477735");
    }

    #[test]
    fn test_validate_document() {
        assert_eq!(validate_document("529.982.247-25").unwrap(), "52998224725");

        let err = validate_document("123").unwrap_err();
        assert_eq!(err.field(), "CustomerCpf");
        assert_eq!(err.to_string(), "Invalid CPF format");
    }

    #[test]
    fn test_validate_customer_name() {
        assert_eq!(validate_customer_name(None).unwrap(), None);
        assert_eq!(validate_customer_name(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_customer_name(Some(" Ana Souza ")).unwrap().as_deref(),
            Some("Ana Souza")
        );
        assert!(validate_customer_name(Some("A")).is_err());
        assert!(validate_customer_name(Some(&"x".repeat(101))).is_err());
    }

    #[test]
    fn test_validate_customer_email() {
        assert_eq!(
            validate_customer_email(Some("ana@example.com")).unwrap().as_deref(),
            Some("ana@example.com")
        );
        assert_eq!(validate_customer_email(Some("")).unwrap(), None);

        for bad in ["ana", "ana@", "@example.com", "ana@example", "a@b@c.com", "ana @x.com"] {
            let err = validate_customer_email(Some(bad)).unwrap_err();
            assert_eq!(err.field(), "CustomerEmail", "{bad}");
        }
    }

    #[test]
    fn test_validate_customer_phone() {
        assert!(validate_customer_phone(Some("+55 (11) 98765-4321")).is_ok());
        assert!(validate_customer_phone(Some("call me")).is_err());
        assert!(validate_customer_phone(Some(&"1".repeat(21))).is_err());
    }

    #[test]
    fn test_validate_prices() {
        assert!(validate_prices(4_500_000, 5_200_000).is_ok());
        assert!(validate_prices(0, 5_200_000).is_err());
        assert!(validate_prices(4_500_000, -1).is_err());

        let err = validate_prices(5_200_000, 5_200_000).unwrap_err();
        assert_eq!(err.field(), "salePriceCents");
    }

    #[test]
    fn test_validate_identifier() {
        assert_eq!(validate_identifier("vinNumber", " ABC ", 17).unwrap(), "ABC");
        assert!(validate_identifier("vinNumber", "  ", 17).is_err());
        assert!(validate_identifier("vinNumber", &"A".repeat(18), 17).is_err());
        assert!(validate_transaction_id("").is_err());
        assert!(validate_mileage(-1).is_err());
    }
}

#[cfg(test)]
mod document_properties {
    use super::*;
    use proptest::prelude::*;

    /// Check digits with the weights written out: `sum * 10 mod 11`, with
    /// 10 folded to 0.
    fn expected_check_digits(prefix: &[u8; 9]) -> (u8, u8) {
        fn weighted(digits: &[u8], weights: &[u32]) -> u32 {
            digits.iter().zip(weights).map(|(d, w)| u32::from(*d) * w).sum()
        }

        let first = (weighted(prefix, &[10, 9, 8, 7, 6, 5, 4, 3, 2]) * 10 % 11 % 10) as u8;
        let second_sum = weighted(prefix, &[11, 10, 9, 8, 7, 6, 5, 4, 3]) + u32::from(first) * 2;
        let second = (second_sum * 10 % 11 % 10) as u8;
        (first, second)
    }

    fn document(prefix: &[u8; 9], first: u8, second: u8) -> String {
        prefix
            .iter()
            .chain([first, second].iter())
            .map(|d| char::from(b'0' + d))
            .collect()
    }

    fn punctuated(plain: &str) -> String {
        format!("{}.{}.{}-{}", &plain[0..3], &plain[3..6], &plain[6..9], &plain[9..])
    }

    proptest! {
        #[test]
        fn matching_check_digits_are_accepted(prefix in proptest::array::uniform9(0u8..=9)) {
            prop_assume!(prefix.iter().any(|d| *d != prefix[0]));
            let (first, second) = expected_check_digits(&prefix);
            let plain = document(&prefix, first, second);

            prop_assert!(is_valid_document(&plain), "{}", plain);
            prop_assert!(is_valid_document(&punctuated(&plain)), "{}", plain);
            prop_assert_eq!(validate_document(&punctuated(&plain)).unwrap(), plain);
        }

        #[test]
        fn wrong_first_check_digit_is_rejected(
            prefix in proptest::array::uniform9(0u8..=9),
            offset in 1u8..=9,
        ) {
            let (first, second) = expected_check_digits(&prefix);
            let plain = document(&prefix, (first + offset) % 10, second);
            prop_assert!(!is_valid_document(&plain), "{}", plain);
        }

        #[test]
        fn wrong_second_check_digit_is_rejected(
            prefix in proptest::array::uniform9(0u8..=9),
            offset in 1u8..=9,
        ) {
            let (first, second) = expected_check_digits(&prefix);
            let plain = document(&prefix, first, (second + offset) % 10);
            prop_assert!(!is_valid_document(&plain), "{}", plain);
        }
    }
}
