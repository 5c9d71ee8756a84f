//! The cart store: canonical in-memory state synchronized with storage.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gocart_kv::KeyValueStore;
use tracing::{debug, warn};

use crate::config::CartConfig;
use crate::error::CartError;
use crate::item::{CartItem, ItemDraft};
use crate::observer::{CartObserver, SubscriptionId};
use crate::snapshot::CartSnapshot;

/// Session-scoped cart state manager.
///
/// Owns the canonical in-memory cart and writes every published snapshot
/// through a [`KeyValueStore`]. The in-memory state is the session's
/// source of truth: storage failures are logged and absorbed, and the
/// persisted copy trails the published state best-effort.
///
/// Every mutation follows the same protocol: capture the current
/// snapshot, compute the next one as a pure function of it, atomically
/// publish the result, then write it through storage. The
/// read-modify-write runs under a single lock, so concurrent mutations
/// serialize and none ever observes a partially-updated cart.
pub struct CartStore {
    config: CartConfig,
    store: Arc<dyn KeyValueStore>,
    state: Mutex<CartSnapshot>,
    /// Version of the newest snapshot written through successfully.
    /// Doubles as the writer lock: writes are serialized under it.
    persisted: Mutex<u64>,
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn CartObserver>)>>,
    next_subscription: AtomicU64,
}

impl CartStore {
    /// Open a cart store over `store` using `config`.
    ///
    /// Fails fast on an invalid configuration. A missing snapshot in
    /// storage yields an empty cart (not an error); an unreadable or
    /// corrupt one is logged and replaced with an empty cart, since there
    /// is no recovery path for historical corrupt data.
    pub fn open(store: Arc<dyn KeyValueStore>, config: CartConfig) -> Result<Self, CartError> {
        config.validate()?;

        let key = config.storage_key.as_str();
        let snapshot = match store.get(key) {
            Ok(Some(blob)) => match decode_items(&blob) {
                Ok(items) => {
                    debug!(key, items = items.len(), "cart state loaded");
                    CartSnapshot::new(0, Arc::new(items))
                }
                Err(e) => {
                    warn!(key, error = %e, "discarding corrupt cart state");
                    CartSnapshot::empty()
                }
            },
            Ok(None) => CartSnapshot::empty(),
            Err(e) => {
                warn!(key, error = %e, "failed to read cart state; starting empty");
                CartSnapshot::empty()
            }
        };

        Ok(Self {
            config,
            store,
            state: Mutex::new(snapshot),
            persisted: Mutex::new(0),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        })
    }

    /// Open a cart store with the default configuration.
    pub fn open_default(store: Arc<dyn KeyValueStore>) -> Result<Self, CartError> {
        Self::open(store, CartConfig::default())
    }

    /// Add `draft` to the cart with quantity 1.
    ///
    /// If an item with the same id is already present this is equivalent
    /// to [`increment`](Self::increment): its quantity grows by one and no
    /// duplicate entry is created. Invalid drafts are rejected before any
    /// state changes.
    pub fn add_to_cart(&self, draft: ItemDraft) -> Result<(), CartError> {
        draft.validate()?;
        self.mutate(move |items| {
            if let Some(existing) = items.iter_mut().find(|i| i.id == draft.id) {
                existing.quantity = existing.quantity.saturating_add(1);
            } else {
                items.push(draft.into_item(1));
            }
            true
        });
        Ok(())
    }

    /// Increase the quantity of the item with `id` by one.
    ///
    /// Returns `false`, leaving the cart untouched, if no such item is in
    /// the cart.
    pub fn increment(&self, id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        self.mutate(|items| {
            match items.iter_mut().find(|i| i.id.as_str() == id) {
                Some(item) => {
                    item.quantity = item.quantity.saturating_add(1);
                    true
                }
                None => false,
            }
        })
    }

    /// Decrease the quantity of the item with `id` by one, removing the
    /// item entirely when it reaches zero.
    ///
    /// Returns `false`, leaving the cart untouched, if no such item is in
    /// the cart.
    pub fn decrement(&self, id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        self.mutate(|items| {
            let Some(index) = items.iter().position(|i| i.id.as_str() == id) else {
                return false;
            };
            if items[index].quantity > 1 {
                items[index].quantity -= 1;
            } else {
                // Zero-quantity items never persist.
                items.remove(index);
            }
            true
        })
    }

    /// The current published snapshot.
    pub fn products(&self) -> CartSnapshot {
        lock(&self.state).clone()
    }

    /// Total unit count across all items.
    pub fn item_count(&self) -> u64 {
        self.products().item_count()
    }

    /// Check whether the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.products().is_empty()
    }

    /// Register `observer` to be called with every published snapshot.
    pub fn subscribe(&self, observer: Arc<dyn CartObserver>) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.observers).push((id, observer));
        id
    }

    /// Remove a previously registered observer.
    ///
    /// Returns `false` if the subscription was not (or is no longer)
    /// registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = lock(&self.observers);
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() < before
    }

    /// Write the current snapshot through storage, reporting the result.
    ///
    /// Mutations absorb write failures and only log them; `flush` is the
    /// explicit durability point for callers that need one.
    pub fn flush(&self) -> Result<(), CartError> {
        let mut persisted = lock(&self.persisted);
        let snapshot = self.products();
        self.write_through(&snapshot)?;
        *persisted = snapshot.version();
        Ok(())
    }

    /// Apply `f` to a copy of the current items and, if it reports a
    /// change, publish the result as a new snapshot and write it through
    /// storage. Returns whether a new snapshot was published.
    fn mutate<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Vec<CartItem>) -> bool,
    {
        let snapshot = {
            let mut state = lock(&self.state);
            let mut items = state.items().to_vec();
            if !f(&mut items) {
                return false;
            }
            let next = CartSnapshot::new(state.version() + 1, Arc::new(items));
            *state = next.clone();
            next
        };

        self.notify(&snapshot);
        self.persist(&snapshot);
        true
    }

    /// Notify observers of a newly published snapshot.
    ///
    /// The observer list is copied out first so user callbacks run without
    /// any internal lock held.
    fn notify(&self, snapshot: &CartSnapshot) {
        let observers: Vec<Arc<dyn CartObserver>> = lock(&self.observers)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer.on_change(snapshot);
        }
    }

    /// Write `snapshot` through the key-value store.
    ///
    /// Writes are serialized under the writer lock and carry the snapshot
    /// version; a writer that lost the race to a newer snapshot skips its
    /// write, so the stored blob never moves backwards. Failures are
    /// logged and absorbed; the in-memory cart remains authoritative, and
    /// a failed version is retried implicitly by the next write-through.
    fn persist(&self, snapshot: &CartSnapshot) {
        let mut persisted = lock(&self.persisted);
        if *persisted >= snapshot.version() {
            return;
        }
        match self.write_through(snapshot) {
            Ok(()) => {
                *persisted = snapshot.version();
                debug!(
                    key = self.config.storage_key.as_str(),
                    version = snapshot.version(),
                    "cart state persisted"
                );
            }
            Err(e) => {
                warn!(
                    key = self.config.storage_key.as_str(),
                    version = snapshot.version(),
                    error = %e,
                    "cart persistence write failed; in-memory state remains authoritative"
                );
            }
        }
    }

    fn write_through(&self, snapshot: &CartSnapshot) -> Result<(), CartError> {
        let blob = serde_json::to_vec(snapshot.items())?;
        self.store.set(&self.config.storage_key, &blob)?;
        Ok(())
    }
}

/// Decode a stored blob into validated cart items.
///
/// Any schema or invariant violation is reported as
/// [`CartError::CorruptState`]; malformed input never panics.
fn decode_items(blob: &[u8]) -> Result<Vec<CartItem>, CartError> {
    let items: Vec<CartItem> =
        serde_json::from_slice(blob).map_err(|e| CartError::CorruptState(e.to_string()))?;
    validate_items(&items)?;
    Ok(items)
}

/// Check the cart invariants on decoded items: unique non-empty ids,
/// quantities of at least one, finite non-negative prices.
fn validate_items(items: &[CartItem]) -> Result<(), CartError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.id.as_str().is_empty() {
            return Err(CartError::CorruptState("empty item id".to_string()));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(CartError::CorruptState(format!(
                "duplicate item id: {}",
                item.id
            )));
        }
        if item.quantity == 0 {
            return Err(CartError::CorruptState(format!(
                "zero quantity for item {}",
                item.id
            )));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(CartError::CorruptState(format!(
                "invalid price for item {}: {}",
                item.id, item.price
            )));
        }
    }
    Ok(())
}

/// Lock, recovering from poisoning: state under these locks is only ever
/// replaced whole, so a panicked writer cannot leave a torn value behind.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
