//! # Cart Rules
//!
//! The cart snapshot and its three mutation rules.
//!
//! ## Snapshot Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Mutations                                       │
//! │                                                                         │
//! │  UI Action            Rule                 Result                       │
//! │  ─────────            ────                 ──────                       │
//! │                                                                         │
//! │  Add product ───────► add(candidate) ────► found:   quantity + 1        │
//! │                                            missing: push, quantity = 1  │
//! │                                                                         │
//! │  Tap "+" ───────────► increment(id) ─────► found:   quantity + 1        │
//! │                                            missing: unchanged           │
//! │                                                                         │
//! │  Tap "-" ───────────► decrement(id) ─────► found:   quantity - 1,       │
//! │                                                     removed at 0        │
//! │                                            missing: unchanged           │
//! │                                                                         │
//! │  NOTE: every rule takes &self and returns a NEW collection. A consumer  │
//! │        holding an older snapshot never observes a partial update.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Ids are unique (add on an existing id bumps the quantity)
//! - Every item has quantity ≥ 1 (reaching 0 removes the line)
//! - Order is first-added order and never changes for surviving lines

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::types::{CartItem, CartTotals, NewCartItem};
use crate::validation::{validate_item_id, validate_price};

// =============================================================================
// Cart Mutation
// =============================================================================

/// A single cart mutation, as queued by the cart service.
#[derive(Debug, Clone, PartialEq)]
pub enum CartMutation {
    Add(NewCartItem),
    Increment(String),
    Decrement(String),
}

impl CartMutation {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            CartMutation::Add(_) => "add_to_cart",
            CartMutation::Increment(_) => "increment",
            CartMutation::Decrement(_) => "decrement",
        }
    }

    /// The id of the line this mutation targets.
    pub fn item_id(&self) -> &str {
        match self {
            CartMutation::Add(candidate) => &candidate.id,
            CartMutation::Increment(id) | CartMutation::Decrement(id) => id,
        }
    }
}

// =============================================================================
// Cart Collection
// =============================================================================

/// An immutable, ordered snapshot of the cart.
///
/// Serializes as a bare JSON array of [`CartItem`]. There is intentionally no
/// `Deserialize`: untrusted items go through [`CartCollection::from_items`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct CartCollection {
    items: Vec<CartItem>,
}

impl CartCollection {
    /// Creates an empty cart.
    pub fn new() -> Self {
        CartCollection { items: Vec::new() }
    }

    /// Builds a collection from untrusted line items, enforcing every invariant.
    ///
    /// ## Errors
    /// - `CoreError::Validation` - empty id or negative/non-finite price
    /// - `CoreError::InvalidQuantity` - quantity of 0
    /// - `CoreError::DuplicateItem` - two lines share an id
    pub fn from_items(items: Vec<CartItem>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());

        for item in &items {
            validate_item_id(&item.id)?;
            validate_price(item.price)?;

            if item.quantity == 0 {
                return Err(CoreError::InvalidQuantity {
                    id: item.id.clone(),
                    quantity: 0,
                });
            }

            if !seen.insert(item.id.as_str()) {
                return Err(CoreError::DuplicateItem(item.id.clone()));
            }
        }

        Ok(CartCollection { items })
    }

    /// Line items in display order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up a line by id.
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Quantity of a line, `None` if it is not in the cart.
    pub fn quantity_of(&self, id: &str) -> Option<u32> {
        self.get(id).map(|item| item.quantity)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    // =========================================================================
    // Mutation Rules
    // =========================================================================

    /// Adds a product, or bumps its quantity if the id is already present.
    ///
    /// An existing line keeps the title, image and price it was first added
    /// with; only the quantity changes.
    pub fn add(&self, candidate: &NewCartItem) -> Self {
        if self.position(&candidate.id).is_some() {
            return self.increment(&candidate.id);
        }

        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend_from_slice(&self.items);
        items.push(CartItem::from_new(candidate));
        CartCollection { items }
    }

    /// Bumps the quantity of `id` by one. Unknown ids are a no-op.
    pub fn increment(&self, id: &str) -> Self {
        let Some(index) = self.position(id) else {
            return self.clone();
        };

        let mut items = self.items.clone();
        if let Some(item) = items.get_mut(index) {
            item.quantity = item.quantity.saturating_add(1);
        }
        CartCollection { items }
    }

    /// Lowers the quantity of `id` by one, removing the line at zero.
    ///
    /// Eligibility is presence alone; where the line sits in the cart does
    /// not matter. Unknown ids are a no-op.
    pub fn decrement(&self, id: &str) -> Self {
        let Some(index) = self.position(id) else {
            return self.clone();
        };

        let mut items = self.items.clone();
        let remaining = items
            .get(index)
            .map(|item| item.quantity.saturating_sub(1))
            .unwrap_or(0);

        if remaining == 0 {
            items.remove(index);
        } else if let Some(item) = items.get_mut(index) {
            item.quantity = remaining;
        }
        CartCollection { items }
    }

    /// Applies one queued mutation.
    pub fn apply(&self, mutation: &CartMutation) -> Self {
        match mutation {
            CartMutation::Add(candidate) => self.add(candidate),
            CartMutation::Increment(id) => self.increment(id),
            CartMutation::Decrement(id) => self.decrement(id),
        }
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Σ price × quantity.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            line_count: u32::try_from(self.items.len()).unwrap_or(u32::MAX),
            total_quantity: self.total_quantity(),
            subtotal: self.subtotal(),
        }
    }
}

impl From<&CartCollection> for CartTotals {
    fn from(cart: &CartCollection) -> Self {
        cart.totals()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
