//! # Validation Module
//!
//! Field validation for cart line items.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  add_to_cart(candidate)                                                │
//! │  └── validate_new_item ── rejects before the command is queued         │
//! │                                                                         │
//! │  CartCollection::from_items (decoded storage blob)                     │
//! │  └── validate_item_id / validate_price per line                        │
//! │                                                                         │
//! │  The mutation rules trust their input: they only ever see items that   │
//! │  passed one of these gates.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gomarket_core::validation::{validate_item_id, validate_price};
//!
//! assert!(validate_item_id("sku-1").is_ok());
//! assert!(validate_price(-1.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::NewCartItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a line item id.
///
/// ## Rules
/// - Must not be empty or whitespace only
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be a finite number (no NaN / infinity)
/// - Must not be negative (zero is a valid free item)
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates an `add_to_cart` candidate.
pub fn validate_new_item(candidate: &NewCartItem) -> ValidationResult<()> {
    validate_item_id(&candidate.id)?;
    validate_price(candidate.price)?;
    Ok(())
}
