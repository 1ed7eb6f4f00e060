//! # gomarket-storage: Persistence Layer for the GoMarket Cart
//!
//! This crate stores the cart blob in a key-value store and turns it back
//! into a [`CartCollection`](gomarket_core::CartCollection).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Cart Data Flow                          │
//! │                                                                         │
//! │  CartService (gomarket-cart)                                           │
//! │       │  load() once, save(new_snapshot) after every mutation           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  gomarket-storage (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌───────────────┐   ┌────────────────┐  │   │
//! │  │   │CartPersistence │   │ KeyValueStore │   │   Database     │  │   │
//! │  │   │(persistence.rs)│──►│  (store.rs)   │   │   (pool.rs)    │  │   │
//! │  │   │                │   │               │   │                │  │   │
//! │  │   │ encode/decode  │   │ MemoryStore   │   │ SqlitePool     │  │   │
//! │  │   │ fixed key      │   │ SqliteKV ─────┼──►│ migrations     │  │   │
//! │  │   └────────────────┘   └───────────────┘   └────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/gomarket/cart.db  (key_value_store table)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The narrow `KeyValueStore` trait and the in-memory store
//! - [`persistence`] - Cart blob load/save under one fixed key
//! - [`pool`] - SQLite connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - SQLite-backed key-value store
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gomarket_storage::{CartPersistence, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/cart.db")).await?;
//! let persistence = CartPersistence::new(Arc::new(db.key_value_store()));
//!
//! let cart = persistence.load().await; // never fails
//! persistence.save(&cart.increment("sku-1")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod persistence;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DecodeError, StorageError, StorageResult};
pub use persistence::{decode_cart, encode_cart, CartPersistence};
pub use pool::{Database, DbConfig};
pub use repository::key_value::SqliteKeyValueStore;
pub use store::{KeyValueStore, MemoryStore};
