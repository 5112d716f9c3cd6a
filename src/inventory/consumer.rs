use std::sync::Arc;

use tracing::debug;

use super::Inventory;
use crate::bus::{Event, Publisher};
use crate::codec::decode_order_event;
use crate::events::OrderEvent;
use crate::ingress::{Consumer, IngressError};

/// Adjusts inventory stock from order events.
///
/// Subscribe it to `order-created-events` and `order-deleted-events`.
/// `OrderUpdated` carries no quantities and is acknowledged untouched.
pub struct OrderStockConsumer<P: Publisher> {
    inventory: Arc<Inventory<P>>,
}

impl<P: Publisher> OrderStockConsumer<P> {
    pub fn new(inventory: Arc<Inventory<P>>) -> Self {
        Self { inventory }
    }
}

impl<P: Publisher> Clone for OrderStockConsumer<P> {
    fn clone(&self) -> Self {
        Self {
            inventory: Arc::clone(&self.inventory),
        }
    }
}

impl<P: Publisher> Consumer for OrderStockConsumer<P> {
    fn name(&self) -> &'static str {
        "order-stock"
    }

    fn handle(&self, event: &Event) -> Result<(), IngressError> {
        let result = match decode_order_event(&event.payload)? {
            OrderEvent::OrderCreated { items, .. } => self.inventory.reserve(&items),
            OrderEvent::OrderDeleted { status, items, .. } => self.inventory.release(status, &items),
            OrderEvent::OrderUpdated { order_id, .. } => {
                debug!(%order_id, "order update has no stock effect");
                Ok(())
            }
        };
        result.map_err(|err| IngressError::Rejected(err.to_string()))
    }
}
