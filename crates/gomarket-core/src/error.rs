//! # Error Types
//!
//! Domain-specific error types for gomarket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gomarket-core errors (this file)                                      │
//! │  ├── CoreError        - Cart invariant violations                      │
//! │  └── ValidationError  - Field validation failures                      │
//! │                                                                         │
//! │  gomarket-storage errors (separate crate)                              │
//! │  └── StorageError     - Key-value store failures                       │
//! │                                                                         │
//! │  gomarket-cart errors (service crate)                                  │
//! │  └── CartError        - What cart consumers see                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → UI                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Increment/decrement of an unknown id is deliberately NOT an error: the
//! mutation rules define it as a no-op.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart invariant violations.
///
/// Raised when a collection is assembled from untrusted line items (for
/// example, a decoded storage blob). The mutation rules themselves never
/// produce these.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two line items share an id.
    #[error("Duplicate cart item id: {0}")]
    DuplicateItem(String),

    /// A line item carries a quantity below 1.
    #[error("Cart item {id} has invalid quantity {quantity}")]
    InvalidQuantity { id: String, quantity: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g. NaN or infinite price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
