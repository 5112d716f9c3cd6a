//! Cart-mutation events published by the cart service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A change to one user's cart.
///
/// Serialized as tagged JSON (`{"type":"CartItemAdded","userId":..}`) by the
/// structured codec, or as `Kind:field:...` by the positional codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum CartEvent {
    CartItemAdded {
        user_id: Uuid,
        product_id: Uuid,
        quantity: u32,
    },
    CartItemRemoved {
        user_id: Uuid,
        product_id: Uuid,
    },
    CartItemQuantityChanged {
        user_id: Uuid,
        product_id: Uuid,
        new_quantity: u32,
    },
    CartCleared {
        user_id: Uuid,
    },
}

impl CartEvent {
    /// The variant tag, as used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            CartEvent::CartItemAdded { .. } => "CartItemAdded",
            CartEvent::CartItemRemoved { .. } => "CartItemRemoved",
            CartEvent::CartItemQuantityChanged { .. } => "CartItemQuantityChanged",
            CartEvent::CartCleared { .. } => "CartCleared",
        }
    }

    pub fn user_id(&self) -> Uuid {
        match *self {
            CartEvent::CartItemAdded { user_id, .. }
            | CartEvent::CartItemRemoved { user_id, .. }
            | CartEvent::CartItemQuantityChanged { user_id, .. }
            | CartEvent::CartCleared { user_id } => user_id,
        }
    }

    pub fn product_id(&self) -> Option<Uuid> {
        match *self {
            CartEvent::CartItemAdded { product_id, .. }
            | CartEvent::CartItemRemoved { product_id, .. }
            | CartEvent::CartItemQuantityChanged { product_id, .. } => Some(product_id),
            CartEvent::CartCleared { .. } => None,
        }
    }
}
