//! Cart store configuration.

use std::fmt;

use gocart_kv::storage_key;
use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// Configuration for a [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage key the entire serialized cart is written under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    storage_key!("cart", "products")
}

impl CartConfig {
    /// Create a configuration with the default storage key.
    pub fn new() -> Self {
        Self {
            storage_key: default_storage_key(),
        }
    }

    /// Create a configuration keyed to a single session.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = CartConfig::for_session("sess_abc");
    /// assert_eq!(config.storage_key, "cart:sess_abc:products");
    /// ```
    pub fn for_session(session_id: impl fmt::Display) -> Self {
        Self {
            storage_key: storage_key!("cart", session_id, "products"),
        }
    }

    /// Set the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Check that the configuration is usable.
    pub(crate) fn validate(&self) -> Result<(), CartError> {
        if self.storage_key.is_empty() {
            return Err(CartError::Configuration(
                "storage key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self::new()
    }
}
