//! # Domain Types
//!
//! Line item types shared by the cart rules, the storage layer and the UI.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Types                                      │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  NewCartItem    │   │    CartItem     │   │   CartTotals    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  id             │   │  line_count     │       │
//! │  │  title          │   │  title          │   │  total_quantity │       │
//! │  │  image_url      │   │  image_url      │   │  subtotal       │       │
//! │  │  price          │   │  price          │   └─────────────────┘       │
//! │  └─────────────────┘   │  quantity (≥1)  │                              │
//! │   addToCart input      └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names serialize as `id`, `title`, `image_url`, `price`, `quantity`,
//! the exact shape of carts already persisted on devices.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Cart Item
// =============================================================================

/// One line of the cart: a product and its requested quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Product id, unique within a collection.
    pub id: String,

    pub title: String,

    /// Opaque image URI.
    pub image_url: String,

    /// Unit price in a currency-agnostic unit. Never negative.
    pub price: f64,

    /// Always ≥ 1 while the item is in a collection.
    pub quantity: u32,
}

impl CartItem {
    /// Creates the first line for a candidate (quantity 1).
    pub fn from_new(candidate: &NewCartItem) -> Self {
        CartItem {
            id: candidate.id.clone(),
            title: candidate.title.clone(),
            image_url: candidate.image_url.clone(),
            price: candidate.price,
            quantity: 1,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

// =============================================================================
// New Cart Item
// =============================================================================

/// A product offered to `add_to_cart`: a [`CartItem`] without quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCartItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl NewCartItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        NewCartItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

impl From<&CartItem> for NewCartItem {
    fn from(item: &CartItem) -> Self {
        NewCartItem {
            id: item.id.clone(),
            title: item.title.clone(),
            image_url: item.image_url.clone(),
            price: item.price,
        }
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Read-only summary of a cart snapshot, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    /// Number of distinct line items.
    pub line_count: u32,

    /// Sum of all quantities.
    #[ts(type = "number")]
    pub total_quantity: u64,

    /// Σ price × quantity.
    pub subtotal: f64,
}
