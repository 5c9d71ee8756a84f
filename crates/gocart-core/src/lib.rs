//! Session-scoped shopping-cart state management.
//!
//! The cart's canonical state lives in memory and is written through to a
//! key-value store on every mutation. The store is read once when the
//! session opens; from then on the in-memory state is authoritative and
//! the persisted copy trails it best-effort.
//!
//! # Example
//!
//! ```rust,ignore
//! use gocart_core::prelude::*;
//! use gocart_kv::MemoryStore;
//! use std::sync::Arc;
//!
//! let cart = CartStore::open_default(Arc::new(MemoryStore::new()))?;
//!
//! cart.add_to_cart(ItemDraft::new("sku-1", "Espresso Cup", "img/cup.png", 12.5))?;
//! cart.increment("sku-1");
//!
//! for item in cart.products().items() {
//!     println!("{} x{}", item.title, item.quantity);
//! }
//! ```

mod config;
mod error;
mod item;
mod observer;
mod snapshot;
mod store;

pub use config::CartConfig;
pub use error::CartError;
pub use item::{CartItem, ItemDraft, ItemId};
pub use observer::{CartObserver, SubscriptionId};
pub use snapshot::CartSnapshot;
pub use store::CartStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CartConfig, CartError, CartItem, CartObserver, CartSnapshot, CartStore, ItemDraft,
        ItemId, SubscriptionId,
    };
}
