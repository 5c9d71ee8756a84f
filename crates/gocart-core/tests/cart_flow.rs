//! End-to-end cart session flows over an in-memory store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use gocart_core::prelude::*;
use gocart_kv::{KeyValueStore, KvError, MemoryStore};

/// Store double whose writes can be switched to fail, while reads keep
/// working against the inner store.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(KvError::Store("simulated write failure".to_string()));
        }
        self.inner.set(key, value)
    }
}

fn draft(id: &str, title: &str, price: f64) -> ItemDraft {
    ItemDraft::new(id, title, format!("img/{id}.png"), price)
}

#[test]
fn test_session_scenario() {
    let cart = CartStore::open_default(Arc::new(MemoryStore::new())).unwrap();

    // 1. Start empty.
    assert!(cart.products().is_empty());

    // 2. First add creates the item with quantity 1.
    cart.add_to_cart(draft("1", "A", 10.0)).unwrap();
    let products = cart.products();
    assert_eq!(products.len(), 1);
    let item = products.get("1").unwrap();
    assert_eq!(item.title, "A");
    assert_eq!(item.image_url, "img/1.png");
    assert_eq!(item.price, 10.0);
    assert_eq!(item.quantity, 1);

    // 3. Adding the same id again merges instead of duplicating.
    cart.add_to_cart(draft("1", "A", 10.0)).unwrap();
    let products = cart.products();
    assert_eq!(products.len(), 1);
    assert_eq!(products.get("1").unwrap().quantity, 2);

    // 4-5. Decrement down to removal.
    assert!(cart.decrement("1"));
    assert_eq!(cart.products().get("1").unwrap().quantity, 1);
    assert!(cart.decrement("1"));
    assert!(cart.products().is_empty());

    // 6. Unknown ids are ignored.
    assert!(!cart.increment("nonexistent"));
    assert!(cart.products().is_empty());
}

#[test]
fn test_state_survives_session_restart() {
    let store = Arc::new(MemoryStore::new());

    {
        let cart = CartStore::open_default(store.clone()).unwrap();
        cart.add_to_cart(draft("1", "Espresso Cup", 12.5)).unwrap();
        cart.add_to_cart(draft("2", "Pour-over Kettle", 42.9)).unwrap();
        cart.increment("2");
    }

    let cart = CartStore::open_default(store).unwrap();
    let products = cart.products();

    assert_eq!(products.len(), 2);
    assert_eq!(products.get("1").unwrap().quantity, 1);
    assert_eq!(products.get("2").unwrap().quantity, 2);
    assert_eq!(products.get("2").unwrap().price, 42.9);
}

#[test]
fn test_write_failure_keeps_memory_authoritative() {
    let store = Arc::new(FlakyStore::default());
    let cart = CartStore::open_default(store.clone()).unwrap();

    store.fail_writes(true);
    cart.add_to_cart(draft("1", "A", 10.0)).unwrap();

    // The mutation landed in memory even though the write-through failed.
    assert_eq!(cart.products().get("1").unwrap().quantity, 1);
    assert_eq!(store.get("cart:products").unwrap(), None);

    // The explicit durability point surfaces the failure.
    assert!(matches!(cart.flush(), Err(CartError::PersistenceWrite(_))));

    // Once writes recover, the next write-through carries the full
    // current state, not just the failed delta.
    store.fail_writes(false);
    cart.add_to_cart(draft("2", "B", 20.0)).unwrap();

    let blob = store.get("cart:products").unwrap().unwrap();
    let stored: Vec<CartItem> = serde_json::from_slice(&blob).unwrap();
    assert_eq!(stored, cart.products().items());
    assert_eq!(stored.len(), 2);
}

#[test]
fn test_flush_recovers_after_write_failure() {
    let store = Arc::new(FlakyStore::default());
    let cart = CartStore::open_default(store.clone()).unwrap();

    store.fail_writes(true);
    cart.add_to_cart(draft("1", "A", 10.0)).unwrap();
    store.fail_writes(false);

    cart.flush().unwrap();
    let blob = store.get("cart:products").unwrap().unwrap();
    let stored: Vec<CartItem> = serde_json::from_slice(&blob).unwrap();
    assert_eq!(stored, cart.products().items());
}

#[test]
fn test_corrupt_state_recovers_and_overwrites() {
    let store = Arc::new(MemoryStore::new());
    store.set("cart:products", b"{\"definitely\":\"not a cart\"}").unwrap();

    let cart = CartStore::open_default(store.clone()).unwrap();
    assert!(cart.products().is_empty());

    cart.add_to_cart(draft("1", "A", 10.0)).unwrap();

    // The first mutation replaces the corrupt blob with valid state.
    let blob = store.get("cart:products").unwrap().unwrap();
    let stored: Vec<CartItem> = serde_json::from_slice(&blob).unwrap();
    assert_eq!(stored.len(), 1);
}

#[test]
fn test_session_keyed_configs_are_isolated() {
    let store = Arc::new(MemoryStore::new());

    let alice = CartStore::open(store.clone(), CartConfig::for_session("alice")).unwrap();
    let bob = CartStore::open(store.clone(), CartConfig::for_session("bob")).unwrap();

    alice.add_to_cart(draft("1", "A", 10.0)).unwrap();
    assert!(bob.products().is_empty());

    let mut keys = store.keys();
    keys.sort();
    assert_eq!(keys, vec!["cart:alice:products".to_string()]);
}

#[test]
fn test_concurrent_increments_are_not_lost() {
    let store = Arc::new(MemoryStore::new());
    let cart = Arc::new(CartStore::open_default(store.clone()).unwrap());
    cart.add_to_cart(draft("1", "A", 10.0)).unwrap();

    let threads: Vec<_> = (0..4)
        .map(|_| {
            let cart = Arc::clone(&cart);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    cart.increment("1");
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    // Every increment is applied, and the stored blob matches the final
    // snapshot: stale writers may skip, but never clobber newer state.
    let products = cart.products();
    assert_eq!(products.get("1").unwrap().quantity, 201);

    let blob = store.get("cart:products").unwrap().unwrap();
    let stored: Vec<CartItem> = serde_json::from_slice(&blob).unwrap();
    assert_eq!(stored, products.items());
}

#[test]
fn test_observers_follow_a_session() {
    let cart = CartStore::open_default(Arc::new(MemoryStore::new())).unwrap();
    let log: Arc<Mutex<Vec<(u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&log);
    cart.subscribe(Arc::new(move |snapshot: &CartSnapshot| {
        sink.lock()
            .unwrap()
            .push((snapshot.version(), snapshot.item_count()));
    }));

    cart.add_to_cart(draft("1", "A", 10.0)).unwrap();
    cart.add_to_cart(draft("1", "A", 10.0)).unwrap();
    cart.decrement("1");
    cart.decrement("1");
    cart.increment("nonexistent");

    // One notification per published snapshot, in version order, and the
    // idempotent miss publishes nothing.
    assert_eq!(*log.lock().unwrap(), vec![(1, 1), (2, 2), (3, 1), (4, 0)]);
}
