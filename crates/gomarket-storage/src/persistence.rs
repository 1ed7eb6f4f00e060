//! # Cart Persistence
//!
//! Loads and saves the whole cart as one JSON blob under one fixed key.
//!
//! ## Blob Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  key:   @gomarketplace:products                                         │
//! │  value: [                                                               │
//! │           {"id":"a","title":"Shoe","image_url":"u","price":10,          │
//! │            "quantity":2},                                               │
//! │           ...                                                           │
//! │         ]                                                               │
//! │                                                                         │
//! │  No version field. Array order is display order.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Load Outcomes
//! ```text
//! missing key / "" / "null"          → empty cart
//! not JSON, wrong shape              → empty cart   (warn)
//! duplicate id, bad price            → empty cart   (warn)
//! line with quantity ≤ 0             → line dropped (warn), rest kept
//! store read failure                 → empty cart   (warn)
//! ```
//!
//! Lines with quantity ≤ 0 come from older app builds whose decrement never
//! removed a line; they are repaired instead of discarding the whole cart.

use std::sync::Arc;

use gomarket_core::{CartCollection, CartItem, DEFAULT_STORAGE_KEY};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DecodeError, StorageResult};
use crate::store::KeyValueStore;

/// One line as found in storage, before invariants are checked.
#[derive(Debug, Deserialize)]
struct StoredItem {
    id: String,
    title: String,
    image_url: String,
    price: f64,
    quantity: i64,
}

/// Decodes a stored cart blob.
///
/// Empty and `null` payloads decode to an empty cart.
pub fn decode_cart(raw: &str) -> Result<CartCollection, DecodeError> {
    if raw.trim().is_empty() {
        return Ok(CartCollection::new());
    }

    let Some(stored) = serde_json::from_str::<Option<Vec<StoredItem>>>(raw)? else {
        return Ok(CartCollection::new());
    };

    let mut items = Vec::with_capacity(stored.len());
    for line in stored {
        if line.quantity <= 0 {
            warn!(
                id = %line.id,
                quantity = line.quantity,
                "Dropping stored cart line with non-positive quantity"
            );
            continue;
        }

        let quantity = u32::try_from(line.quantity).map_err(|_| DecodeError::QuantityOutOfRange {
            id: line.id.clone(),
            quantity: line.quantity,
        })?;

        items.push(CartItem {
            id: line.id,
            title: line.title,
            image_url: line.image_url,
            price: line.price,
            quantity,
        });
    }

    Ok(CartCollection::from_items(items)?)
}

/// Encodes a cart as its stored JSON array.
pub fn encode_cart(cart: &CartCollection) -> StorageResult<String> {
    Ok(serde_json::to_string(cart)?)
}

// =============================================================================
// Cart Persistence
// =============================================================================

/// Reads and writes the cart blob through a [`KeyValueStore`].
#[derive(Clone)]
pub struct CartPersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for CartPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartPersistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CartPersistence {
    /// Persistence under [`DEFAULT_STORAGE_KEY`].
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        CartPersistence {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the stored cart. Never fails: every fault degrades to an empty
    /// cart.
    pub async fn load(&self) -> CartCollection {
        let raw = match self.store.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No stored cart");
                return CartCollection::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read stored cart, starting empty");
                return CartCollection::new();
            }
        };

        match decode_cart(&raw) {
            Ok(cart) => {
                debug!(key = %self.key, lines = cart.len(), "Loaded stored cart");
                cart
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding malformed stored cart");
                CartCollection::new()
            }
        }
    }

    /// Replaces the stored cart with `cart`.
    ///
    /// Callers pass the snapshot produced by the mutation being persisted,
    /// never an earlier one.
    pub async fn save(&self, cart: &CartCollection) -> StorageResult<()> {
        let payload = encode_cart(cart)?;
        self.store.set_item(&self.key, &payload).await?;
        debug!(key = %self.key, lines = cart.len(), "Saved cart");
        Ok(())
    }
}
