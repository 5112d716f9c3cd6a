//! Cart operations, guarded by the local stock replica.

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::ServiceError;
use crate::aggregate::Cart;
use crate::bus::Publisher;
use crate::egress::EventPublisher;
use crate::events::CartEvent;
use crate::replica::StockReplica;
use crate::store::CartStore;

/// Cart operations for one service instance.
///
/// Each operation reads the stock replica, mutates the durable cart and
/// publishes one cart event, in that order. Nothing is locked across those
/// steps: two concurrent adds for the same product can both pass the stock
/// check before either is saved.
///
/// When the publish fails the stored cart is put back as it was, so the
/// durable cart never holds a change no cart event describes.
pub struct CartService<S: CartStore, P: Publisher> {
    store: S,
    stock: StockReplica,
    egress: EventPublisher<P>,
}

impl<S: CartStore, P: Publisher> CartService<S, P> {
    pub fn new(store: S, stock: StockReplica, egress: EventPublisher<P>) -> Self {
        Self {
            store,
            stock,
            egress,
        }
    }

    pub fn stock(&self) -> &StockReplica {
        &self.stock
    }

    /// The user's cart, created empty on first access.
    pub fn get_cart(&self, user_id: Uuid) -> Result<Cart, ServiceError> {
        self.load_or_create(user_id)
            .inspect_err(|err| err.log("get_cart"))
    }

    pub fn add_item(&self, user_id: Uuid, product_id: Uuid, quantity: u32) -> Result<Cart, ServiceError> {
        self.try_add_item(user_id, product_id, quantity)
            .inspect_err(|err| err.log("add_item"))
    }

    pub fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<Cart, ServiceError> {
        self.try_remove_item(user_id, product_id)
            .inspect_err(|err| err.log("remove_item"))
    }

    /// Adjust a line by `delta`.
    ///
    /// A zero delta or an absent line leaves the cart untouched. A result of
    /// zero or less removes the line.
    pub fn change_quantity(&self, user_id: Uuid, product_id: Uuid, delta: i64) -> Result<Cart, ServiceError> {
        self.try_change_quantity(user_id, product_id, delta)
            .inspect_err(|err| err.log("change_quantity"))
    }

    pub fn clear_cart(&self, user_id: Uuid) -> Result<Cart, ServiceError> {
        self.try_clear_cart(user_id)
            .inspect_err(|err| err.log("clear_cart"))
    }

    fn try_add_item(&self, user_id: Uuid, product_id: Uuid, quantity: u32) -> Result<Cart, ServiceError> {
        if quantity == 0 {
            return Err(ServiceError::InvalidQuantity(0));
        }
        let (stored, mut cart) = self.load_working(user_id)?;
        let in_cart = cart.quantity_of(product_id);
        let requested = u64::from(in_cart) + u64::from(quantity);
        self.check_stock(product_id, requested)?;

        let total = cart.add_quantity(product_id, quantity);
        self.commit(
            stored.as_ref(),
            &cart,
            CartEvent::CartItemAdded {
                user_id,
                product_id,
                quantity,
            },
        )?;

        info!(%user_id, %product_id, added = quantity, total, "item added to cart");
        Ok(cart)
    }

    fn try_remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<Cart, ServiceError> {
        let (stored, mut cart) = self.load_working(user_id)?;
        let removed = cart
            .remove_item(product_id)
            .ok_or(ServiceError::CartItemNotFound {
                user_id,
                product_id,
            })?;
        self.commit(
            stored.as_ref(),
            &cart,
            CartEvent::CartItemRemoved {
                user_id,
                product_id,
            },
        )?;

        info!(%user_id, %product_id, quantity = removed.quantity, "item removed from cart");
        Ok(cart)
    }

    fn try_change_quantity(&self, user_id: Uuid, product_id: Uuid, delta: i64) -> Result<Cart, ServiceError> {
        if delta == 0 {
            let (_, cart) = self.load_working(user_id)?;
            return Ok(cart);
        }
        let (stored, mut cart) = self.load_working(user_id)?;
        let Some(current) = cart.item(product_id).map(|item| item.quantity) else {
            debug!(%user_id, %product_id, delta, "quantity change for absent line ignored");
            return Ok(cart);
        };

        let target = i64::from(current).saturating_add(delta);
        if target <= 0 {
            return self.try_remove_item(user_id, product_id);
        }
        let new_quantity = u32::try_from(target).map_err(|_| ServiceError::InvalidQuantity(target))?;
        self.check_stock(product_id, u64::from(new_quantity))?;

        cart.set_quantity(product_id, new_quantity);
        self.commit(
            stored.as_ref(),
            &cart,
            CartEvent::CartItemQuantityChanged {
                user_id,
                product_id,
                new_quantity,
            },
        )?;

        info!(%user_id, %product_id, from = current, to = new_quantity, "cart quantity changed");
        Ok(cart)
    }

    fn try_clear_cart(&self, user_id: Uuid) -> Result<Cart, ServiceError> {
        let (stored, mut cart) = self.load_working(user_id)?;
        let removed = cart.clear();
        self.commit(stored.as_ref(), &cart, CartEvent::CartCleared { user_id })?;

        info!(%user_id, lines = removed, "cart cleared");
        Ok(cart)
    }

    fn check_stock(&self, product_id: Uuid, requested: u64) -> Result<(), ServiceError> {
        let available = self.stock.get_stock(product_id);
        match available {
            Some(stock) if requested <= u64::from(stock) => Ok(()),
            _ => Err(ServiceError::ProductUnavailable {
                product_id,
                requested,
                available,
            }),
        }
    }

    /// Save `cart` and publish `event`. A failed publish puts `stored` back.
    fn commit(&self, stored: Option<&Cart>, cart: &Cart, event: CartEvent) -> Result<(), ServiceError> {
        self.store.save(cart)?;
        if let Err(err) = self.egress.publish_cart(&event) {
            self.restore(cart.user_id, stored);
            return Err(err.into());
        }
        Ok(())
    }

    fn restore(&self, user_id: Uuid, stored: Option<&Cart>) {
        let restored = match stored {
            Some(cart) => self.store.save(cart),
            None => self.store.delete(user_id).map(|_| ()),
        };
        match restored {
            Ok(()) => warn!(%user_id, "cart change rolled back after publish failure"),
            Err(err) => error!(%user_id, error = %err, "cart rollback failed"),
        }
    }

    /// The stored cart, if any, and a working copy to mutate. Nothing is saved.
    fn load_working(&self, user_id: Uuid) -> Result<(Option<Cart>, Cart), ServiceError> {
        let stored = self.store.load_by_user(user_id)?;
        let working = stored.clone().unwrap_or_else(|| Cart::new(user_id));
        Ok((stored, working))
    }

    fn load_or_create(&self, user_id: Uuid) -> Result<Cart, ServiceError> {
        if let Some(cart) = self.store.load_by_user(user_id)? {
            return Ok(cart);
        }
        let cart = Cart::new(user_id);
        self.store.save(&cart)?;
        info!(%user_id, cart_id = %cart.cart_id, "cart created");
        Ok(cart)
    }
}
