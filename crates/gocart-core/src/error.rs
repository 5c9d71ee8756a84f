//! Cart error types.

use thiserror::Error;

/// Errors that can occur in cart operations.
///
/// Only [`Configuration`](CartError::Configuration) and
/// [`InvalidItem`](CartError::InvalidItem) surface to callers as hard
/// failures; storage-layer errors are absorbed by the store so the
/// in-memory cart stays usable, and show up here only through the explicit
/// [`flush`](crate::CartStore::flush).
#[derive(Error, Debug)]
pub enum CartError {
    /// The store was constructed with an unusable configuration.
    #[error("Invalid cart configuration: {0}")]
    Configuration(String),

    /// The persisted snapshot could not be decoded into valid cart items.
    #[error("Corrupt cart state in storage: {0}")]
    CorruptState(String),

    /// A write-through to the key-value store failed.
    #[error("Cart persistence write failed: {0}")]
    PersistenceWrite(#[from] gocart_kv::KvError),

    /// An item draft failed validation.
    #[error("Invalid cart item: {0}")]
    InvalidItem(String),

    /// The snapshot could not be serialized.
    #[error("Cart serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
