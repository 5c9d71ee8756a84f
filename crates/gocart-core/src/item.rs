//! Cart item types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// A unique item identifier within a cart.
///
/// Serializes as the bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Create an ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A line item held in the cart.
///
/// Field names match the storage format exactly:
/// `{ "id", "title", "image_url", "price", "quantity" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Unique identifier within the cart.
    pub id: ItemId,
    /// Display title.
    pub title: String,
    /// Opaque reference to an image resource.
    pub image_url: String,
    /// Unit price. Non-negative and finite.
    pub price: f64,
    /// Number of units. At least 1 while the item is in the cart.
    pub quantity: u32,
}

/// An item about to enter the cart: a [`CartItem`] without a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    /// Unique identifier within the cart.
    pub id: ItemId,
    /// Display title.
    pub title: String,
    /// Opaque reference to an image resource.
    pub image_url: String,
    /// Unit price. Non-negative and finite.
    pub price: f64,
}

impl ItemDraft {
    /// Create a draft.
    pub fn new(
        id: impl Into<ItemId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Check that the draft can become a valid cart item.
    pub(crate) fn validate(&self) -> Result<(), CartError> {
        if self.id.as_str().is_empty() {
            return Err(CartError::InvalidItem("empty item id".to_string()));
        }
        if !self.price.is_finite() {
            return Err(CartError::InvalidItem(format!(
                "price for {} is not a finite number",
                self.id
            )));
        }
        if self.price < 0.0 {
            return Err(CartError::InvalidItem(format!(
                "negative price for {}: {}",
                self.id, self.price
            )));
        }
        Ok(())
    }

    /// Turn the draft into a cart item with the given quantity.
    pub(crate) fn into_item(self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}
