//! Order operations, driven by the local cart replica.

use tracing::{error, info, warn};
use uuid::Uuid;

use super::ServiceError;
use crate::aggregate::{Order, OrderItem, OrderStatus, PaymentType};
use crate::bus::Publisher;
use crate::egress::EventPublisher;
use crate::events::OrderEvent;
use crate::replica::CartReplica;
use crate::store::{OrderStore, StoreError};

/// Order operations for one service instance.
///
/// Orders are built from the [`CartReplica`], not from the cart service's
/// durable cart, so an order reflects whichever cart events had arrived when
/// it was placed. A failed publish undoes the store write, so a retried
/// request never leaves a duplicate or half-applied order behind.
pub struct OrderService<S: OrderStore, P: Publisher> {
    store: S,
    carts: CartReplica,
    egress: EventPublisher<P>,
}

impl<S: OrderStore, P: Publisher> OrderService<S, P> {
    pub fn new(store: S, carts: CartReplica, egress: EventPublisher<P>) -> Self {
        Self {
            store,
            carts,
            egress,
        }
    }

    pub fn carts(&self) -> &CartReplica {
        &self.carts
    }

    /// Place an order from the user's replicated cart.
    ///
    /// The payment type is matched case-insensitively. An empty cart is
    /// reported before an invalid payment type.
    pub fn create_order(
        &self,
        user_id: Uuid,
        delivery_address: &str,
        payment_type: &str,
    ) -> Result<Order, ServiceError> {
        self.try_create_order(user_id, delivery_address, payment_type)
            .inspect_err(|err| err.log("create_order"))
    }

    pub fn update_order_status(&self, order_id: Uuid, status: &str) -> Result<Order, ServiceError> {
        self.try_update_order_status(order_id, status)
            .inspect_err(|err| err.log("update_order_status"))
    }

    /// Delete an order and return it as it was.
    pub fn delete_order(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        self.try_delete_order(order_id)
            .inspect_err(|err| err.log("delete_order"))
    }

    pub fn get_order_by_id(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        self.load(order_id).inspect_err(|err| err.log("get_order_by_id"))
    }

    pub fn get_all_orders(&self) -> Result<Vec<Order>, ServiceError> {
        self.store
            .list()
            .map_err(ServiceError::from)
            .inspect_err(|err| err.log("get_all_orders"))
    }

    fn try_create_order(
        &self,
        user_id: Uuid,
        delivery_address: &str,
        payment_type: &str,
    ) -> Result<Order, ServiceError> {
        let snapshot = self.carts.snapshot_cart(user_id);
        if snapshot.is_empty() {
            return Err(ServiceError::EmptyCart(user_id));
        }
        let payment_type: PaymentType = payment_type
            .parse()
            .map_err(ServiceError::InvalidPaymentType)?;

        let items = snapshot.into_iter().map(OrderItem::from).collect();
        let order = Order::place(user_id, delivery_address, payment_type, items);
        let order_id = order.order_id;
        self.store.save(&order)?;
        self.publish_or_undo(
            order_id,
            &OrderEvent::OrderCreated {
                order_id,
                user_id,
                items: order.lines(),
            },
            |store| store.delete(order_id).map(|_| ()),
        )?;

        info!(
            %user_id,
            order_id = %order.order_id,
            lines = order.items().len(),
            payment = %payment_type,
            "order created"
        );
        Ok(order)
    }

    fn try_update_order_status(&self, order_id: Uuid, status: &str) -> Result<Order, ServiceError> {
        let mut order = self.load(order_id)?;
        let status: OrderStatus = status.parse().map_err(ServiceError::InvalidStatus)?;

        let before = order.clone();
        order.status = status;
        self.store.save(&order)?;
        self.publish_or_undo(
            order_id,
            &OrderEvent::OrderUpdated { order_id, status },
            |store| store.save(&before),
        )?;
        let previous = before.status;

        info!(%order_id, from = %previous, to = %status, "order status updated");
        Ok(order)
    }

    fn try_delete_order(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        let order = self.load(order_id)?;
        self.store.delete(order_id)?;
        self.publish_or_undo(
            order_id,
            &OrderEvent::OrderDeleted {
                order_id,
                status: order.status,
                items: order.lines(),
            },
            |store| store.save(&order),
        )?;

        info!(%order_id, status = %order.status, "order deleted");
        Ok(order)
    }

    /// Publish `event`. On failure run `undo` against the store and return
    /// the publish error.
    fn publish_or_undo(
        &self,
        order_id: Uuid,
        event: &OrderEvent,
        undo: impl FnOnce(&S) -> Result<(), StoreError>,
    ) -> Result<(), ServiceError> {
        let Err(err) = self.egress.publish_order(event) else {
            return Ok(());
        };
        match undo(&self.store) {
            Ok(()) => warn!(%order_id, "order change rolled back after publish failure"),
            Err(undo_err) => error!(%order_id, error = %undo_err, "order rollback failed"),
        }
        Err(err.into())
    }

    fn load(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        self.store
            .get(order_id)?
            .ok_or(ServiceError::OrderNotFound(order_id))
    }
}
