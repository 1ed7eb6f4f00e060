//! # Cart Service
//!
//! The single writer of the cart. One actor task owns the current snapshot
//! and applies mutations strictly in the order they arrive.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Service Actor                               │
//! │                                                                         │
//! │  CartHandle ──┐                                                         │
//! │  CartHandle ──┼──▶ mpsc<CartCommand> ──▶ ┌───────────────────────────┐ │
//! │  CartHandle ──┘     (bounded, FIFO)      │  1. next = current.apply() │ │
//! │                                          │  2. watch.send(next)       │ │
//! │       ▲                                  │  3. persistence.save(next) │ │
//! │       │          oneshot reply           │  4. reply(next)            │ │
//! │       └──────────────────────────────────┴───────────────────────────┘ │
//! │                                                                         │
//! │  Command N+1 is not dequeued until step 4 of command N is done, so     │
//! │  the cart always equals a left-to-right fold of the calls.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! ```text
//! spawn ──▶ LOADING ──(load done)──▶ SERVING ──(shutdown / all handles gone)──▶ STOPPED
//!              │                                                               ▲
//!              └──────────────(shutdown: load result discarded)────────────────┘
//! ```
//!
//! Commands sent while LOADING wait in the queue and are applied on top of
//! the loaded cart.

use std::sync::Arc;

use gomarket_core::validation::validate_new_item;
use gomarket_core::{CartCollection, CartMutation, CartTotals, NewCartItem};
use gomarket_storage::CartPersistence;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{CartError, CartResult};

// =============================================================================
// Status
// =============================================================================

/// Observable health of the cart service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartStatus {
    /// The initial load has completed.
    pub loaded: bool,
    /// Mutations that changed the cart.
    pub mutations_applied: u64,
    /// Saves that failed. The in-memory cart stays authoritative.
    pub saves_failed: u64,
    /// Error of the latest save, cleared once a save succeeds again.
    pub last_save_error: Option<String>,
}

// =============================================================================
// Commands
// =============================================================================

/// Messages accepted by the service actor.
#[derive(Debug)]
enum CartCommand {
    Mutate {
        mutation: CartMutation,
        reply: oneshot::Sender<Arc<CartCollection>>,
    },
}

// =============================================================================
// Cart Service
// =============================================================================

/// Actor state. Built by [`CartService::new`] and driven by [`CartService::run`].
pub struct CartService {
    persistence: CartPersistence,
    instance: Uuid,
    cmd_rx: mpsc::Receiver<CartCommand>,
    snapshot_tx: watch::Sender<Arc<CartCollection>>,
    status_tx: watch::Sender<CartStatus>,
    shutdown_rx: oneshot::Receiver<()>,
}

impl CartService {
    /// Creates the service and the handle that talks to it.
    ///
    /// Nothing happens until [`run`](Self::run) is polled.
    pub fn new(
        persistence: CartPersistence,
        command_buffer: usize,
        shutdown_rx: oneshot::Receiver<()>,
        instance: Uuid,
    ) -> (Self, CartHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(command_buffer.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(CartCollection::new()));
        let (status_tx, status_rx) = watch::channel(CartStatus::default());

        let service = CartService {
            persistence,
            instance,
            cmd_rx,
            snapshot_tx,
            status_tx,
            shutdown_rx,
        };

        let handle = CartHandle {
            cmd_tx,
            snapshot_rx,
            status_rx,
            instance,
        };

        (service, handle)
    }

    /// Main actor loop.
    pub async fn run(mut self) {
        info!(instance = %self.instance, key = %self.persistence.key(), "Cart service started");

        let loaded = tokio::select! {
            cart = self.persistence.load() => cart,
            _ = &mut self.shutdown_rx => {
                info!(instance = %self.instance, "Cart service stopped during initial load, discarding it");
                return;
            }
        };

        info!(instance = %self.instance, lines = loaded.len(), "Initial cart load complete");
        self.snapshot_tx.send_replace(Arc::new(loaded));
        self.status_tx.send_modify(|status| status.loaded = true);

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown_rx => {
                    info!(instance = %self.instance, "Cart service shutting down");
                    break;
                }
                cmd = self.cmd_rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!(instance = %self.instance, "All cart handles dropped, stopping");
                        break;
                    };

                    match cmd {
                        CartCommand::Mutate { mutation, reply } => {
                            let snapshot = self.mutate(&mutation).await;
                            // The caller may have stopped waiting.
                            let _ = reply.send(snapshot);
                        }
                    }
                }
            }
        }
    }

    /// Compute, publish and persist one mutation.
    async fn mutate(&self, mutation: &CartMutation) -> Arc<CartCollection> {
        let current = self.snapshot_tx.borrow().clone();
        let next = current.apply(mutation);

        if next == *current {
            debug!(
                op = mutation.name(),
                id = %mutation.item_id(),
                "Cart mutation changed nothing"
            );
            return current;
        }

        let next = Arc::new(next);
        self.snapshot_tx.send_replace(next.clone());
        self.status_tx
            .send_modify(|status| status.mutations_applied += 1);

        debug!(
            op = mutation.name(),
            id = %mutation.item_id(),
            lines = next.len(),
            "Cart mutation applied"
        );

        match self.persistence.save(&next).await {
            Ok(()) => {
                self.status_tx
                    .send_if_modified(|status| status.last_save_error.take().is_some());
            }
            Err(e) => {
                error!(
                    instance = %self.instance,
                    op = mutation.name(),
                    error = %e,
                    "Failed to persist cart, keeping in-memory state"
                );
                self.status_tx.send_modify(|status| {
                    status.saves_failed += 1;
                    status.last_save_error = Some(e.to_string());
                });
            }
        }

        next
    }
}

// =============================================================================
// Cart Handle
// =============================================================================

/// Cheap, cloneable access to a running cart service.
#[derive(Clone)]
pub struct CartHandle {
    cmd_tx: mpsc::Sender<CartCommand>,
    snapshot_rx: watch::Receiver<Arc<CartCollection>>,
    status_rx: watch::Receiver<CartStatus>,
    instance: Uuid,
}

impl std::fmt::Debug for CartHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartHandle")
            .field("instance", &self.instance)
            .field("available", &self.is_available())
            .finish()
    }
}

impl CartHandle {
    /// Current cart snapshot.
    pub fn products(&self) -> Arc<CartCollection> {
        self.snapshot_rx.borrow().clone()
    }

    pub fn totals(&self) -> CartTotals {
        self.snapshot_rx.borrow().totals()
    }

    /// Receiver notified every time a mutation changes the cart.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartCollection>> {
        self.snapshot_rx.clone()
    }

    pub fn status(&self) -> CartStatus {
        self.status_rx.borrow().clone()
    }

    /// Id of the service instance, as it appears in logs.
    pub fn instance(&self) -> Uuid {
        self.instance
    }

    /// False once the service has stopped.
    pub fn is_available(&self) -> bool {
        !self.cmd_tx.is_closed()
    }

    /// Waits for the initial load to finish.
    pub async fn ready(&self) -> CartResult<()> {
        let mut status_rx = self.status_rx.clone();
        status_rx
            .wait_for(|status| status.loaded)
            .await
            .map(|_| ())
            .map_err(|_| CartError::ProviderUnavailable)
    }

    /// Adds a product, or bumps its quantity if it is already in the cart.
    pub async fn add_to_cart(&self, item: NewCartItem) -> CartResult<Arc<CartCollection>> {
        validate_new_item(&item)?;
        self.submit(CartMutation::Add(item)).await
    }

    pub async fn increment(&self, id: impl Into<String>) -> CartResult<Arc<CartCollection>> {
        self.submit(CartMutation::Increment(id.into())).await
    }

    /// Lowers the quantity by one, removing the line when it reaches zero.
    pub async fn decrement(&self, id: impl Into<String>) -> CartResult<Arc<CartCollection>> {
        self.submit(CartMutation::Decrement(id.into())).await
    }

    async fn submit(&self, mutation: CartMutation) -> CartResult<Arc<CartCollection>> {
        let (reply, reply_rx) = oneshot::channel();

        self.cmd_tx
            .send(CartCommand::Mutate { mutation, reply })
            .await
            .map_err(|_| CartError::ProviderUnavailable)?;

        reply_rx.await.map_err(|_| CartError::ProviderUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomarket_storage::{KeyValueStore, MemoryStore};
    use gomarket_core::DEFAULT_STORAGE_KEY;

    fn spawn(store: Arc<MemoryStore>) -> (CartHandle, oneshot::Sender<()>) {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (service, handle) =
            CartService::new(CartPersistence::new(store), 8, shutdown_rx, Uuid::new_v4());
        tokio::spawn(service.run());
        (handle, shutdown_tx)
    }

    fn shoe() -> NewCartItem {
        NewCartItem::new("a", "Shoe", "u", 10.0)
    }

    #[tokio::test]
    async fn test_mutation_publishes_then_replies() {
        let store = Arc::new(MemoryStore::new());
        let (handle, _shutdown) = spawn(store.clone());
        handle.ready().await.unwrap();

        let mut changes = handle.subscribe();
        let cart = handle.add_to_cart(shoe()).await.unwrap();

        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), cart);
        assert_eq!(handle.products(), cart);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_no_op_skips_publish_and_save() {
        let store = Arc::new(MemoryStore::new());
        let (handle, _shutdown) = spawn(store.clone());
        handle.ready().await.unwrap();

        let mut changes = handle.subscribe();
        changes.borrow_and_update();

        let cart = handle.increment("missing").await.unwrap();
        let cart_after_decrement = handle.decrement("missing").await.unwrap();

        assert!(cart.is_empty());
        assert!(cart_after_decrement.is_empty());
        assert!(!changes.has_changed().unwrap());
        assert_eq!(store.writes(), 0);
        assert_eq!(handle.status().mutations_applied, 0);
    }

    #[tokio::test]
    async fn test_invalid_item_never_reaches_queue() {
        let store = Arc::new(MemoryStore::new());
        let (handle, _shutdown) = spawn(store.clone());
        handle.ready().await.unwrap();

        let err = handle
            .add_to_cart(NewCartItem::new("", "Nameless", "u", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidItem(_)));

        let err = handle
            .add_to_cart(NewCartItem::new("a", "Shoe", "u", f64::NAN))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidItem(_)));

        assert!(handle.products().is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_save_failure_is_absorbed() {
        let store = Arc::new(MemoryStore::new());
        let (handle, _shutdown) = spawn(store.clone());
        handle.ready().await.unwrap();

        store.fail_writes(true);
        let cart = handle.add_to_cart(shoe()).await.unwrap();
        assert_eq!(cart.quantity_of("a"), Some(1));

        let status = handle.status();
        assert_eq!(status.saves_failed, 1);
        assert!(status.last_save_error.is_some());
        assert!(store.peek(DEFAULT_STORAGE_KEY).await.is_none());

        // The next successful save carries the full snapshot.
        store.fail_writes(false);
        let cart = handle.increment("a").await.unwrap();
        let stored = store.get_item(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
        assert_eq!(gomarket_storage::decode_cart(&stored).unwrap(), *cart);

        let status = handle.status();
        assert_eq!(status.mutations_applied, 2);
        assert_eq!(status.saves_failed, 1);
        assert_eq!(status.last_save_error, None);
    }

    #[tokio::test]
    async fn test_stops_when_shutdown_sent() {
        let (handle, shutdown) = spawn(Arc::new(MemoryStore::new()));
        handle.ready().await.unwrap();

        shutdown.send(()).unwrap();

        let err = handle.increment("a").await.unwrap_err();
        assert!(err.is_provider_unavailable());
        assert!(!handle.is_available());
    }

    #[tokio::test]
    async fn test_stops_when_all_handles_dropped() {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (service, handle) = CartService::new(
            CartPersistence::new(Arc::new(MemoryStore::new())),
            4,
            shutdown_rx,
            Uuid::new_v4(),
        );
        let task = tokio::spawn(service.run());

        drop(handle);
        task.await.unwrap();
        drop(shutdown_tx);
    }
}
