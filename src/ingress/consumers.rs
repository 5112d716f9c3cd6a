//! Consumers for the replicated channels.

use std::sync::Arc;

use super::{Consumer, IngressError};
use crate::bus::{Event, Publisher};
use crate::codec::{decode_cart_message, decode_envelope, decode_order_event, DecodeError};
use crate::events::{OrderEvent, ProductChanged, ProductDeleted};
use crate::replica::{CartReplica, StockReplica};
use crate::service::CartService;
use crate::store::CartStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StockChange {
    Upsert,
    Remove,
}

/// Keeps a [`StockReplica`] in line with product events.
#[derive(Clone)]
pub struct StockConsumer {
    replica: StockReplica,
    change: StockChange,
}

impl StockConsumer {
    /// For `product-created` and `product-updated`.
    pub fn upserts(replica: StockReplica) -> Self {
        Self {
            replica,
            change: StockChange::Upsert,
        }
    }

    /// For `product-deleted`. A deletion without a product id is malformed.
    pub fn removals(replica: StockReplica) -> Self {
        Self {
            replica,
            change: StockChange::Remove,
        }
    }
}

impl Consumer for StockConsumer {
    fn name(&self) -> &'static str {
        match self.change {
            StockChange::Upsert => "stock-upsert",
            StockChange::Remove => "stock-remove",
        }
    }

    fn handle(&self, event: &Event) -> Result<(), IngressError> {
        match self.change {
            StockChange::Upsert => {
                let product: ProductChanged = decode_envelope(&event.payload)?;
                self.replica.upsert_stock(product.product_id, product.quantity);
            }
            StockChange::Remove => {
                let deleted: ProductDeleted = decode_envelope(&event.payload)?;
                let product_id = deleted
                    .product_id
                    .ok_or(DecodeError::MissingIdentifier("productId"))?;
                self.replica.remove_stock(product_id);
            }
        }
        Ok(())
    }
}

/// Rebuilds a [`CartReplica`] from cart events in either wire format.
#[derive(Clone)]
pub struct CartEventConsumer {
    replica: CartReplica,
}

impl CartEventConsumer {
    pub fn new(replica: CartReplica) -> Self {
        Self { replica }
    }
}

impl Consumer for CartEventConsumer {
    fn name(&self) -> &'static str {
        "cart-events"
    }

    fn handle(&self, event: &Event) -> Result<(), IngressError> {
        let cart_event = decode_cart_message(&event.payload)?;
        self.replica.apply_cart_event(&cart_event);
        Ok(())
    }
}

/// Empties the buyer's cart once an order has been created from it.
pub struct OrderCreatedConsumer<S: CartStore, P: Publisher> {
    carts: Arc<CartService<S, P>>,
}

impl<S: CartStore, P: Publisher> OrderCreatedConsumer<S, P> {
    pub fn new(carts: Arc<CartService<S, P>>) -> Self {
        Self { carts }
    }
}

impl<S: CartStore, P: Publisher> Consumer for OrderCreatedConsumer<S, P> {
    fn name(&self) -> &'static str {
        "order-created"
    }

    fn handle(&self, event: &Event) -> Result<(), IngressError> {
        let user_id = match decode_order_event(&event.payload)? {
            OrderEvent::OrderCreated { user_id, .. } => user_id,
            other => {
                return Err(DecodeError::UnexpectedType {
                    expected: "OrderCreated",
                    actual: other.kind(),
                }
                .into())
            }
        };
        self.carts
            .clear_cart(user_id)
            .map(|_| ())
            .map_err(|err| IngressError::Rejected(err.to_string()))
    }
}
