use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line item of a durable cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub item_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
}

/// The durable cart aggregate, one per user.
///
/// Owned by the cart service's store; never shared with other services except
/// through the cart events it causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub cart_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart for a user.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            cart_id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            items: Vec::new(),
        }
    }

    pub fn item(&self, product_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Quantity of a product already in the cart (0 when absent).
    pub fn quantity_of(&self, product_id: Uuid) -> u32 {
        self.item(product_id).map(|i| i.quantity).unwrap_or(0)
    }

    /// Increment the line item for a product, inserting it if absent.
    /// Returns the resulting quantity.
    pub fn add_quantity(&mut self, product_id: Uuid, quantity: u32) -> u32 {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(quantity);
                item.quantity
            }
            None => {
                self.items.push(CartItem {
                    item_id: Uuid::new_v4(),
                    product_id,
                    quantity,
                });
                quantity
            }
        }
    }

    /// Overwrite the quantity of an existing line item. Returns false if absent.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32) -> bool {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, product_id: Uuid) -> Option<CartItem> {
        let index = self.items.iter().position(|i| i.product_id == product_id)?;
        Some(self.items.remove(index))
    }

    /// Remove every line item. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
