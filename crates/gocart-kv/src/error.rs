//! Storage error types.

use thiserror::Error;

/// Errors reported by [`KeyValueStore`](crate::KeyValueStore) implementations.
#[derive(Error, Debug)]
pub enum KvError {
    /// Failed to open the underlying store.
    #[error("Failed to open store: {0}")]
    Open(String),

    /// Failed to perform a store operation.
    #[error("Store operation failed: {0}")]
    Store(String),
}
