//! # GoMarket Cart
//!
//! Shopping cart state for the GoMarket storefront: one actor owns the cart,
//! consumers talk to it through a [`CartContext`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           gomarket-cart                                 │
//! │                                                                         │
//! │  ┌──────────────┐      ┌──────────────┐      ┌──────────────────────┐  │
//! │  │ CartProvider │─────▶│ CartService  │─────▶│ CartPersistence      │  │
//! │  │  mount()     │spawn │  (actor)     │save  │ (gomarket-storage)   │  │
//! │  │  unmount()   │      │              │load  │                      │  │
//! │  └──────┬───────┘      └──────▲───────┘      └──────────┬───────────┘  │
//! │         │ context()           │ mpsc + oneshot          │              │
//! │         ▼                     │                         ▼              │
//! │  ┌──────────────┐      ┌──────┴───────┐      ┌──────────────────────┐  │
//! │  │ CartContext  │─────▶│ CartHandle   │      │ KeyValueStore        │  │
//! │  │  cart()?     │      │ add_to_cart  │      │ Memory / SQLite      │  │
//! │  └──────────────┘      │ increment    │      └──────────────────────┘  │
//! │                        │ decrement    │                                │
//! │                        │ products()   │◀── watch<Arc<CartCollection>>  │
//! │                        └──────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```no_run
//! use std::sync::Arc;
//! use gomarket_cart::{CartConfig, CartProvider};
//! use gomarket_core::NewCartItem;
//! use gomarket_storage::{CartPersistence, MemoryStore};
//!
//! # async fn demo() -> gomarket_cart::CartResult<()> {
//! let config = CartConfig::default();
//! let persistence = CartPersistence::with_key(Arc::new(MemoryStore::new()), &config.storage.key);
//! let provider = CartProvider::mount(persistence, &config.service);
//! provider.ready().await?;
//!
//! let context = provider.context();
//! let cart = context.cart()?;
//! cart.add_to_cart(NewCartItem::new("sku-1", "Shoe", "https://img/shoe.png", 49.9)).await?;
//!
//! provider.unmount().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod service;

pub use config::{CartConfig, ServiceSettings, StorageSettings};
pub use error::{CartError, CartResult};
pub use provider::{CartContext, CartProvider};
pub use service::{CartHandle, CartService, CartStatus};
