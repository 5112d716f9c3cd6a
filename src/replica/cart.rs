use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::OrderItem;
use crate::events::CartEvent;

/// One product line of a replicated cart. `quantity` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

impl From<LineItem> for OrderItem {
    fn from(item: LineItem) -> Self {
        OrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

/// Per-user cart contents rebuilt purely from cart events.
///
/// Each event is applied under the owning shard's write guard, so a
/// concurrent [`snapshot_cart`](Self::snapshot_cart) sees the list either
/// before or after the event, never in between. A user whose list becomes
/// empty is dropped from the map.
#[derive(Clone, Default)]
pub struct CartReplica {
    carts: Arc<DashMap<Uuid, Vec<LineItem>>>,
}

impl CartReplica {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one cart event.
    ///
    /// Not idempotent for `CartItemAdded`: applying the same event twice adds
    /// its quantity twice.
    pub fn apply_cart_event(&self, event: &CartEvent) {
        match *event {
            CartEvent::CartItemAdded {
                user_id,
                product_id,
                quantity,
            } => {
                if quantity == 0 {
                    debug!(%user_id, %product_id, "ignoring add of zero quantity");
                    return;
                }
                let mut lines = self.carts.entry(user_id).or_default();
                let total = match lines.iter().position(|line| line.product_id == product_id) {
                    Some(index) => {
                        let line = &mut lines[index];
                        line.quantity = line.quantity.saturating_add(quantity);
                        line.quantity
                    }
                    None => {
                        lines.push(LineItem {
                            product_id,
                            quantity,
                        });
                        quantity
                    }
                };
                info!(%user_id, %product_id, quantity = total, "cart replica line added");
            }
            CartEvent::CartItemRemoved {
                user_id,
                product_id,
            } => self.remove_line(user_id, product_id),
            CartEvent::CartItemQuantityChanged {
                user_id,
                product_id,
                new_quantity: 0,
            } => self.remove_line(user_id, product_id),
            CartEvent::CartItemQuantityChanged {
                user_id,
                product_id,
                new_quantity,
            } => {
                let Some(mut lines) = self.carts.get_mut(&user_id) else {
                    debug!(%user_id, %product_id, "quantity change for unknown cart ignored");
                    return;
                };
                match lines.iter_mut().find(|line| line.product_id == product_id) {
                    Some(line) => {
                        line.quantity = new_quantity;
                        info!(%user_id, %product_id, quantity = new_quantity, "cart replica line changed");
                    }
                    None => {
                        debug!(%user_id, %product_id, "quantity change for unknown line ignored")
                    }
                }
            }
            CartEvent::CartCleared { user_id } => {
                let removed = self.carts.remove(&user_id).map(|(_, lines)| lines.len());
                info!(%user_id, lines = removed.unwrap_or(0), "cart replica cleared");
            }
        }
    }

    /// Point-in-time copy of a user's lines; empty if the user has none.
    pub fn snapshot_cart(&self, user_id: Uuid) -> Vec<LineItem> {
        self.carts
            .get(&user_id)
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Number of users with at least one line.
    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }

    fn remove_line(&self, user_id: Uuid, product_id: Uuid) {
        if let Entry::Occupied(mut entry) = self.carts.entry(user_id) {
            let before = entry.get().len();
            entry.get_mut().retain(|line| line.product_id != product_id);
            if entry.get().len() != before {
                info!(%user_id, %product_id, "cart replica line removed");
            }
            if entry.get().is_empty() {
                entry.remove();
            }
        }
    }
}
