//! # Storage Error Types
//!
//! Error types for key-value store operations and cart blob decoding.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          serde_json::Error / CoreError      │
//! │       │                                     │                           │
//! │       ▼                                     ▼                           │
//! │  StorageError ← context + category     DecodeError                     │
//! │       │                                     │                           │
//! │       ▼                                     ▼                           │
//! │  CartService logs it, keeps going      CartPersistence::load maps it   │
//! │  (never reaches cart consumers)        to an empty cart                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gomarket_core::CoreError;
use thiserror::Error;

/// Key-value store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// The store refused the operation (closed pool, injected fault).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The cart could not be serialized.
    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Internal database error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to StorageError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → StorageError::QueryFailed
/// sqlx::Error::PoolTimedOut   → StorageError::PoolExhausted
/// sqlx::Error::PoolClosed     → StorageError::Unavailable
/// Other                       → StorageError::Internal
/// ```
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StorageError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StorageError::PoolExhausted,
            sqlx::Error::PoolClosed => StorageError::Unavailable("Pool is closed".to_string()),
            _ => StorageError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Decode Error
// =============================================================================

/// Why a stored cart blob could not be turned into a collection.
///
/// Never crosses the crate boundary as a failure: `CartPersistence::load`
/// logs it and falls back to an empty cart.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not a JSON array of line items.
    #[error("Malformed cart payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Quantity too large to represent.
    #[error("Cart item {id} has out-of-range quantity {quantity}")]
    QuantityOutOfRange { id: String, quantity: i64 },

    /// Line items break a cart invariant (duplicate id, bad price...).
    #[error("Invalid cart payload: {0}")]
    Invalid(#[from] CoreError),
}
