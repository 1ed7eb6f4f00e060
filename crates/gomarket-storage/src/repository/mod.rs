//! # Repository Module
//!
//! SQLite-backed implementations of the storage interfaces.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartPersistence                                                        │
//! │       │  store.set_item("@gomarketplace:products", "[...]")             │
//! │       ▼                                                                 │
//! │  SqliteKeyValueStore                                                    │
//! │  ├── get_item(&self, key)                                               │
//! │  └── set_item(&self, key, value)   (UPSERT)                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  key_value_store table                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQL stays in this module; everything above it only sees the
//! [`KeyValueStore`](crate::store::KeyValueStore) trait.

pub mod key_value;
