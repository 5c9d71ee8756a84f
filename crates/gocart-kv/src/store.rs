//! The key-value interface the cart persists through.

use crate::KvError;

/// A key-value store holding opaque blobs.
///
/// This is the interface the cart consumes; implementations may back it
/// with whatever engine they like (files, an embedded database, a platform
/// store). Methods take `&self` so implementations can use interior
/// mutability (`Mutex`, `RwLock`) for thread-safe access.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the last blob written under `key`.
    ///
    /// Returns `Ok(None)` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Durably store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError>;
}

/// Helper to build storage keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = storage_key!("cart", session_id, "products");
/// // Returns "cart:sess_abc:products"
/// ```
#[macro_export]
macro_rules! storage_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_storage_key_single_part() {
        assert_eq!(storage_key!("cart", "products"), "cart:products");
    }

    #[test]
    fn test_storage_key_multiple_parts() {
        let session = "sess_abc";
        assert_eq!(
            storage_key!("cart", session, "products"),
            "cart:sess_abc:products"
        );
    }

    #[test]
    fn test_storage_key_non_string_parts() {
        assert_eq!(storage_key!("cart", 42), "cart:42");
    }
}
