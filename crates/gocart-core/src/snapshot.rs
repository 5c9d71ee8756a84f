//! Published cart snapshots.

use std::sync::Arc;

use crate::item::CartItem;

/// An immutable view of the cart, published as the current truth at a
/// point in time.
///
/// Snapshots never change once published. They are cheap to clone (the
/// item sequence is shared), and the version increases monotonically with
/// every publish, so holders can tell which of two snapshots is newer.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    version: u64,
    items: Arc<Vec<CartItem>>,
}

impl CartSnapshot {
    pub(crate) fn new(version: u64, items: Arc<Vec<CartItem>>) -> Self {
        Self { version, items }
    }

    /// The empty cart, version 0.
    pub(crate) fn empty() -> Self {
        Self::new(0, Arc::new(Vec::new()))
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Monotonically increasing publish version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Find an item by id.
    pub fn get(&self, id: impl AsRef<str>) -> Option<&CartItem> {
        let id = id.as_ref();
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total unit count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}
