//! # Cart Error Types
//!
//! Errors that reach cart consumers.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────────┐  ┌─────────────────┐  ┌─────────────────────┐ │
//! │  │  Wiring             │  │  Input          │  │  Configuration      │ │
//! │  │                     │  │                 │  │                     │ │
//! │  │  ProviderUnavailable│  │  InvalidItem    │  │  InvalidConfig      │ │
//! │  │                     │  │                 │  │  ConfigLoadFailed   │ │
//! │  │                     │  │                 │  │  ConfigSaveFailed   │ │
//! │  └─────────────────────┘  └─────────────────┘  └─────────────────────┘ │
//! │                                                                         │
//! │  NOT HERE: storage faults during load/save. CartPersistence and the    │
//! │  cart service log and absorb them.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gomarket_core::ValidationError;
use gomarket_storage::StorageError;
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart error type.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Wiring Errors
    // =========================================================================
    /// The cart was used without a mounted provider, or after unmount.
    #[error("Cart is not available: no CartProvider is mounted")]
    ProviderUnavailable,

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// An `add_to_cart` candidate failed validation.
    #[error("Invalid cart item: {0}")]
    InvalidItem(#[from] ValidationError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid cart configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Opening the backing store failed at startup.
    #[error("Storage unavailable: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// True for the "used outside a provider" wiring error.
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, CartError::ProviderUnavailable)
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}
