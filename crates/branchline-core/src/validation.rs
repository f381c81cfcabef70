//! # Validation Module
//!
//! Input validation for values a person types: quantities, search terms,
//! sale dates.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI / UI input                                                         │
//! │      │  "3", "yerba", "2024-03-01"                                      │
//! │      ▼                                                                  │
//! │  THIS MODULE  ──► ValidationError (field + reason)                      │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  DraftSale rules (stock ceiling, dedup) ──► CoreError                   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Backend re-validates on POST /sales (final arbiter)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_SEARCH_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Wire and CLI format of a sale date.
pub const SALE_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested line quantity.
///
/// ```rust
/// use branchline_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a unit price. Zero is allowed (free items), negatives are not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::BelowMinimum {
            field: "price".to_string(),
            min: 0,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a free-text search term.
///
/// Empty is fine (no filtering). Returns the trimmed term.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

/// Parses a `YYYY-MM-DD` sale date.
///
/// ```rust
/// use branchline_core::validation::parse_sale_date;
///
/// let date = parse_sale_date(" 2024-03-01 ").unwrap();
/// assert_eq!(date.to_string(), "2024-03-01");
/// assert!(parse_sale_date("01/03/2024").is_err());
/// ```
pub fn parse_sale_date(input: &str) -> ValidationResult<NaiveDate> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: "sale_date".to_string(),
        });
    }

    NaiveDate::parse_from_str(input, SALE_DATE_FORMAT).map_err(|e| ValidationError::InvalidFormat {
        field: "sale_date".to_string(),
        reason: format!("expected YYYY-MM-DD ({})", e),
    })
}

/// Serde adapter for `YYYY-MM-DD` date fields, in both directions.
///
/// ```rust,ignore
/// #[serde(with = "branchline_core::validation::as_sale_date")]
/// pub sale_date: NaiveDate,
/// ```
pub mod as_sale_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_sale_date, SALE_DATE_FORMAT};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(SALE_DATE_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_sale_date(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(250).is_ok());
        assert_eq!(
            validate_quantity(-2),
            Err(ValidationError::MustBePositive {
                field: "quantity".to_string()
            })
        );
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(1)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  yerba ").unwrap(), "yerba");
        assert_eq!(validate_search_query("").unwrap(), "");

        let long = "x".repeat(MAX_SEARCH_LEN + 1);
        assert!(matches!(
            validate_search_query(&long),
            Err(ValidationError::TooLong { max: MAX_SEARCH_LEN, .. })
        ));
    }

    #[test]
    fn test_parse_sale_date() {
        assert_eq!(
            parse_sale_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(
            parse_sale_date("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_sale_date("2023-02-29"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_sale_date_adapter() {
        #[derive(Debug, serde::Serialize, serde::Deserialize)]
        struct Dated {
            #[serde(with = "as_sale_date")]
            sale_date: NaiveDate,
        }

        let dated: Dated = serde_json::from_str(r#"{"sale_date": "2024-03-01"}"#).unwrap();
        assert_eq!(dated.sale_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(
            serde_json::to_string(&dated).unwrap(),
            r#"{"sale_date":"2024-03-01"}"#
        );

        assert!(serde_json::from_str::<Dated>(r#"{"sale_date": "01/03/2024"}"#).is_err());
        assert!(serde_json::from_str::<Dated>(r#"{"sale_date": ""}"#).is_err());
    }
}
