//! HashMap-backed stores for tests and single-process deployments.
//!
//! Records are kept as bitcode bytes so that callers never share a live
//! aggregate with the store; every load hands out a fresh copy.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use super::{CartStore, OrderStore, StoreError};
use crate::aggregate::{Cart, Order};

/// Carts keyed by user id. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<Uuid, Vec<u8>>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let carts = self
            .carts
            .read()
            .map_err(|_| StoreError::LockPoisoned("cart read"))?;
        Ok(carts.len())
    }
}

impl CartStore for InMemoryCartStore {
    fn load_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError> {
        let carts = self
            .carts
            .read()
            .map_err(|_| StoreError::LockPoisoned("cart read"))?;
        match carts.get(&user_id) {
            Some(bytes) => Ok(Some(bitcode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let bytes = bitcode::serialize(cart)?;
        let mut carts = self
            .carts
            .write()
            .map_err(|_| StoreError::LockPoisoned("cart write"))?;
        carts.insert(cart.user_id, bytes);
        Ok(())
    }

    fn delete(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let mut carts = self
            .carts
            .write()
            .map_err(|_| StoreError::LockPoisoned("cart write"))?;
        Ok(carts.remove(&user_id).is_some())
    }
}

/// Orders keyed by order id. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, Vec<u8>>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn get(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| StoreError::LockPoisoned("order read"))?;
        match orders.get(&order_id) {
            Some(bytes) => Ok(Some(bitcode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| StoreError::LockPoisoned("order read"))?;
        let mut all = orders
            .values()
            .map(|bytes| bitcode::deserialize::<Order>(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        all.sort_by_key(|order| (order.created_at, order.order_id));
        Ok(all)
    }

    fn save(&self, order: &Order) -> Result<(), StoreError> {
        let bytes = bitcode::serialize(order)?;
        let mut orders = self
            .orders
            .write()
            .map_err(|_| StoreError::LockPoisoned("order write"))?;
        orders.insert(order.order_id, bytes);
        Ok(())
    }

    fn delete(&self, order_id: Uuid) -> Result<bool, StoreError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| StoreError::LockPoisoned("order write"))?;
        Ok(orders.remove(&order_id).is_some())
    }
}
