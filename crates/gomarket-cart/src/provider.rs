//! # Cart Provider
//!
//! Mounts the cart service and hands consumers an explicit [`CartContext`]
//! instead of a process-wide global.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartProvider::mount(persistence, settings)                             │
//! │     ├── spawns CartService::run()    (first step: one load)             │
//! │     └── keeps the shutdown sender + JoinHandle                          │
//! │                                                                         │
//! │  provider.context() ──▶ CartContext ──▶ .cart()? ──▶ &CartHandle        │
//! │                                                                         │
//! │  CartContext::detached()  ──▶ .cart() = Err(ProviderUnavailable)        │
//! │  after unmount / drop     ──▶ .cart() = Err(ProviderUnavailable)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gomarket_storage::CartPersistence;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ServiceSettings;
use crate::error::{CartError, CartResult};
use crate::service::{CartHandle, CartService};

// =============================================================================
// Cart Provider
// =============================================================================

/// Owner of one running cart service.
///
/// Dropping the provider stops the service, same as [`unmount`](Self::unmount)
/// without waiting for the task to finish.
#[derive(Debug)]
pub struct CartProvider {
    handle: CartHandle,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    instance: Uuid,
}

impl CartProvider {
    /// Spawns the cart service. Must be called inside a Tokio runtime.
    ///
    /// Returns immediately; the initial load runs in the background. Use
    /// [`ready`](Self::ready) to wait for it.
    pub fn mount(persistence: CartPersistence, settings: &ServiceSettings) -> Self {
        let instance = Uuid::new_v4();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (service, handle) =
            CartService::new(persistence, settings.command_buffer, shutdown_rx, instance);

        info!(%instance, command_buffer = settings.command_buffer, "Mounting cart provider");
        let task = tokio::spawn(service.run());

        CartProvider {
            handle,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
            instance,
        }
    }

    /// Context to pass down to cart consumers.
    pub fn context(&self) -> CartContext {
        CartContext {
            handle: Some(self.handle.clone()),
        }
    }

    pub fn handle(&self) -> &CartHandle {
        &self.handle
    }

    /// Waits for the initial load to finish.
    pub async fn ready(&self) -> CartResult<()> {
        self.handle.ready().await
    }

    /// Stops the service and waits for its task to exit.
    ///
    /// An initial load still in flight is discarded. Calls already queued
    /// but not yet applied fail with [`CartError::ProviderUnavailable`].
    pub async fn unmount(mut self) {
        self.signal_shutdown();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(instance = %self.instance, error = %e, "Cart service task ended abnormally");
            }
        }

        info!(instance = %self.instance, "Cart provider unmounted");
    }

    fn signal_shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // The service may already be gone.
            let _ = tx.send(());
        }
    }
}

impl Drop for CartProvider {
    fn drop(&mut self) {
        self.signal_shutdown();
    }
}

// =============================================================================
// Cart Context
// =============================================================================

/// What cart consumers receive.
///
/// A context is either attached to a mounted provider or detached. The
/// default context is detached.
#[derive(Debug, Clone, Default)]
pub struct CartContext {
    handle: Option<CartHandle>,
}

impl CartContext {
    /// A context with no provider behind it.
    pub fn detached() -> Self {
        Self::default()
    }

    /// The cart API, or [`CartError::ProviderUnavailable`] when no running
    /// provider backs this context.
    pub fn cart(&self) -> CartResult<&CartHandle> {
        match &self.handle {
            Some(handle) if handle.is_available() => Ok(handle),
            _ => Err(CartError::ProviderUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use gomarket_core::{NewCartItem, DEFAULT_STORAGE_KEY};
    use gomarket_storage::{decode_cart, Database, DbConfig, MemoryStore};

    const MALFORMED: &str = r#"[{"id":"a","title":"Shoe""#;

    fn mount(store: Arc<MemoryStore>) -> CartProvider {
        CartProvider::mount(CartPersistence::new(store), &ServiceSettings::default())
    }

    fn item(id: &str) -> NewCartItem {
        NewCartItem::new(id, format!("Product {id}"), format!("https://img/{id}.png"), 10.0)
    }

    async fn stored(store: &MemoryStore) -> gomarket_core::CartCollection {
        let raw = store.peek(DEFAULT_STORAGE_KEY).await.unwrap_or_default();
        decode_cart(&raw).unwrap()
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    #[tokio::test]
    async fn test_add_to_empty_cart() {
        let store = Arc::new(MemoryStore::new());
        let provider = mount(store.clone());
        provider.ready().await.unwrap();

        let cart = provider.context().cart().unwrap().add_to_cart(item("a")).await.unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("a"), Some(1));
        assert_eq!(stored(&store).await, *cart);
    }

    #[tokio::test]
    async fn test_re_add_bumps_quantity() {
        let store = Arc::new(MemoryStore::new());
        let provider = mount(store.clone());
        let cart = provider.context();
        let cart = cart.cart().unwrap();
        provider.ready().await.unwrap();

        cart.add_to_cart(item("a")).await.unwrap();
        let after = cart.add_to_cart(item("a")).await.unwrap();

        assert_eq!(after.len(), 1);
        assert_eq!(after.quantity_of("a"), Some(2));
        assert_eq!(stored(&store).await, *after);
    }

    #[tokio::test]
    async fn test_decrement_lowers_quantity() {
        let store = Arc::new(MemoryStore::new());
        let provider = mount(store.clone());
        let handle = provider.handle();
        provider.ready().await.unwrap();

        handle.add_to_cart(item("a")).await.unwrap();
        handle.add_to_cart(item("a")).await.unwrap();
        let after = handle.decrement("a").await.unwrap();

        assert_eq!(after.quantity_of("a"), Some(1));
    }

    #[tokio::test]
    async fn test_decrement_to_zero_removes_line() {
        let store = Arc::new(MemoryStore::new());
        let provider = mount(store.clone());
        let handle = provider.handle();
        provider.ready().await.unwrap();

        handle.add_to_cart(item("a")).await.unwrap();
        let after = handle.decrement("a").await.unwrap();
        assert!(after.is_empty());
        assert_eq!(store.peek(DEFAULT_STORAGE_KEY).await.as_deref(), Some("[]"));

        // A later decrement does not bring it back.
        let again = handle.decrement("a").await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_increment_missing_id_is_no_op() {
        let store = Arc::new(MemoryStore::new());
        let provider = mount(store.clone());
        let handle = provider.handle();
        provider.ready().await.unwrap();

        handle.add_to_cart(item("a")).await.unwrap();
        let writes = store.writes();

        let after = handle.increment("zzz").await.unwrap();

        assert_eq!(after.len(), 1);
        assert_eq!(after.quantity_of("a"), Some(1));
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn test_malformed_payload_loads_empty() {
        let store = Arc::new(MemoryStore::new().with_entry(DEFAULT_STORAGE_KEY, MALFORMED));
        let provider = mount(store.clone());

        provider.ready().await.unwrap();

        assert!(provider.handle().products().is_empty());
        assert!(provider.handle().status().loaded);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_loads_stored_cart_in_order() {
        let blob = r#"[
            {"id":"b","title":"Hat","image_url":"u","price":4,"quantity":3},
            {"id":"a","title":"Shoe","image_url":"v","price":10,"quantity":1}
        ]"#;
        let store = Arc::new(MemoryStore::new().with_entry(DEFAULT_STORAGE_KEY, blob));
        let provider = mount(store);
        provider.ready().await.unwrap();

        let cart = provider.handle().products();
        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let totals = provider.handle().totals();
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.total_quantity, 4);
        assert_eq!(totals.subtotal, 22.0);
    }

    // =========================================================================
    // Ordering and concurrency
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_increments_all_apply() {
        let store = Arc::new(
            MemoryStore::new()
                .with_entry(
                    DEFAULT_STORAGE_KEY,
                    r#"[{"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":1}]"#,
                )
                .with_latency(Duration::from_millis(50)),
        );
        let provider = mount(store.clone());
        let handle = provider.handle();
        provider.ready().await.unwrap();

        let (r1, r2, r3, r4, r5) = tokio::join!(
            handle.increment("a"),
            handle.increment("a"),
            handle.increment("a"),
            handle.increment("a"),
            handle.increment("a"),
        );

        let replies: Vec<u32> = [r1, r2, r3, r4, r5]
            .into_iter()
            .map(|r| r.unwrap().quantity_of("a").unwrap())
            .collect();
        assert_eq!(replies, vec![2, 3, 4, 5, 6]);

        assert_eq!(handle.products().quantity_of("a"), Some(6));
        assert_eq!(stored(&store).await, *handle.products());
        assert_eq!(store.writes(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interleaved_calls_fold_left_to_right() {
        let store = Arc::new(MemoryStore::new().with_latency(Duration::from_millis(20)));
        let provider = mount(store.clone());
        let handle = provider.handle();
        provider.ready().await.unwrap();

        let _ = tokio::join!(
            handle.add_to_cart(item("a")),
            handle.add_to_cart(item("b")),
            handle.decrement("a"),
            handle.add_to_cart(item("a")),
            handle.increment("b"),
        );

        let cart = handle.products();
        let lines: Vec<(&str, u32)> = cart
            .items()
            .iter()
            .map(|i| (i.id.as_str(), i.quantity))
            .collect();
        assert_eq!(lines, vec![("b", 2), ("a", 1)]);
        assert_eq!(stored(&store).await, *cart);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_before_load_apply_on_loaded_cart() {
        let store = Arc::new(
            MemoryStore::new()
                .with_entry(
                    DEFAULT_STORAGE_KEY,
                    r#"[{"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":1}]"#,
                )
                .with_latency(Duration::from_millis(100)),
        );
        let provider = mount(store.clone());
        let handle = provider.handle();

        let (added, bumped) = tokio::join!(handle.add_to_cart(item("b")), handle.increment("a"));
        added.unwrap();
        let cart = bumped.unwrap();

        let lines: Vec<(&str, u32)> = cart
            .items()
            .iter()
            .map(|i| (i.id.as_str(), i.quantity))
            .collect();
        assert_eq!(lines, vec![("a", 2), ("b", 1)]);
        assert_eq!(stored(&store).await, *cart);
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[tokio::test]
    async fn test_detached_context_is_unavailable() {
        let err = CartContext::detached().cart().unwrap_err();
        assert!(err.is_provider_unavailable());
        assert!(CartContext::default().cart().is_err());
    }

    #[tokio::test]
    async fn test_unmount_during_slow_load_discards_it() {
        let store = Arc::new(
            MemoryStore::new()
                .with_entry(
                    DEFAULT_STORAGE_KEY,
                    r#"[{"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":1}]"#,
                )
                .with_latency(Duration::from_secs(30)),
        );
        let provider = mount(store.clone());
        let context = provider.context();
        let handle = provider.handle().clone();

        provider.unmount().await;

        assert!(handle.products().is_empty());
        assert!(!handle.status().loaded);
        assert!(handle.ready().await.is_err());
        assert_eq!(store.writes(), 0);
        assert!(context.cart().unwrap_err().is_provider_unavailable());
    }

    #[tokio::test]
    async fn test_retained_handle_fails_after_unmount() {
        let provider = mount(Arc::new(MemoryStore::new()));
        provider.ready().await.unwrap();
        let handle = provider.handle().clone();
        handle.add_to_cart(item("a")).await.unwrap();

        provider.unmount().await;

        let err = handle.increment("a").await.unwrap_err();
        assert!(err.is_provider_unavailable());
        let err = handle.add_to_cart(item("b")).await.unwrap_err();
        assert!(err.is_provider_unavailable());

        // Last snapshot stays readable.
        assert_eq!(handle.products().quantity_of("a"), Some(1));
    }

    #[tokio::test]
    async fn test_drop_stops_service() {
        let provider = mount(Arc::new(MemoryStore::new()));
        provider.ready().await.unwrap();
        let context = provider.context();
        let handle = provider.handle().clone();

        drop(provider);

        let err = handle.increment("a").await.unwrap_err();
        assert!(err.is_provider_unavailable());
        assert!(context.cart().unwrap_err().is_provider_unavailable());
    }

    #[tokio::test]
    async fn test_two_providers_are_independent() {
        let store = Arc::new(MemoryStore::new());
        let first = CartProvider::mount(
            CartPersistence::with_key(store.clone(), "@test:first"),
            &ServiceSettings::default(),
        );
        let second = CartProvider::mount(
            CartPersistence::with_key(store.clone(), "@test:second"),
            &ServiceSettings::default(),
        );
        first.ready().await.unwrap();
        second.ready().await.unwrap();

        first.handle().add_to_cart(item("a")).await.unwrap();

        assert_eq!(first.handle().products().len(), 1);
        assert!(second.handle().products().is_empty());
        assert_ne!(first.handle().instance(), second.handle().instance());
        assert!(store.peek("@test:second").await.is_none());
    }

    #[tokio::test]
    async fn test_sqlite_backed_cart_survives_remount() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("cart.db")))
            .await
            .unwrap();

        let provider = CartProvider::mount(
            CartPersistence::new(Arc::new(db.key_value_store())),
            &ServiceSettings::default(),
        );
        provider.ready().await.unwrap();
        provider.handle().add_to_cart(item("a")).await.unwrap();
        provider.handle().add_to_cart(item("b")).await.unwrap();
        let before = provider.handle().increment("a").await.unwrap();
        provider.unmount().await;

        let provider = CartProvider::mount(
            CartPersistence::new(Arc::new(db.key_value_store())),
            &ServiceSettings::default(),
        );
        provider.ready().await.unwrap();

        assert_eq!(provider.handle().products(), before);
        provider.unmount().await;
        db.close().await;
    }
}
