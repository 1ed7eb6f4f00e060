//! # gomarket-core: Pure Cart Rules for GoMarket
//!
//! This crate is the **heart** of the GoMarket cart. It contains the cart
//! data model and every mutation rule as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI collaborators                             │   │
//! │  │    Catalog ──► Cart screen ──► Floating cart badge              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartHandle (gomarket-cart)             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────────┐  ┌───────────────┐          │   │
//! │  │   │   types   │  │      cart      │  │  validation   │          │   │
//! │  │   │ CartItem  │  │ CartCollection │  │    rules      │          │   │
//! │  │   │ NewCart.. │  │ add/inc/dec    │  │    checks     │          │   │
//! │  │   └───────────┘  └────────────────┘  └───────────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                gomarket-storage (Persistence Layer)             │   │
//! │  │            key-value store, cart blob encode/decode             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line item types (CartItem, NewCartItem, CartTotals)
//! - [`cart`] - The immutable cart snapshot and its mutation rules
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation
//!
//! ## Design Principles
//!
//! 1. **Snapshots**: Every mutation returns a new collection, the old one is untouched
//! 2. **No I/O**: Storage, network, file system access is FORBIDDEN here
//! 3. **Presence, not position**: an item is eligible for a mutation when it is found
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{CartCollection, NewCartItem};
//!
//! let shoe = NewCartItem::new("a", "Shoe", "u", 10.0);
//!
//! let cart = CartCollection::new().add(&shoe).add(&shoe);
//! assert_eq!(cart.quantity_of("a"), Some(2));
//!
//! let cart = cart.decrement("a").decrement("a");
//! assert!(cart.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use gomarket_core::CartItem` instead of
// `use gomarket_core::types::CartItem`

pub use cart::{CartCollection, CartMutation};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the cart blob lives under.
///
/// ## Why this exact string?
/// Carts written by earlier releases of the app live under this key. The key
/// carries no version; changing the blob format means migrating to a new key.
pub const DEFAULT_STORAGE_KEY: &str = "@gomarketplace:products";
