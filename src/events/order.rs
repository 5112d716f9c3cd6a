//! Order lifecycle events published by the order service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::OrderStatus;

/// One ordered product, as carried on order events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Structured order event with a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum OrderEvent {
    OrderCreated {
        order_id: Uuid,
        user_id: Uuid,
        items: Vec<OrderLine>,
    },
    OrderUpdated {
        order_id: Uuid,
        status: OrderStatus,
    },
    OrderDeleted {
        order_id: Uuid,
        status: OrderStatus,
        items: Vec<OrderLine>,
    },
}

impl OrderEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated { .. } => "OrderCreated",
            OrderEvent::OrderUpdated { .. } => "OrderUpdated",
            OrderEvent::OrderDeleted { .. } => "OrderDeleted",
        }
    }

    pub fn order_id(&self) -> Uuid {
        match self {
            OrderEvent::OrderCreated { order_id, .. }
            | OrderEvent::OrderUpdated { order_id, .. }
            | OrderEvent::OrderDeleted { order_id, .. } => *order_id,
        }
    }
}
