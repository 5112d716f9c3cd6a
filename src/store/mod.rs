//! Durable storage for cart and order aggregates.
//!
//! The business layer only sees these traits. Each method is a blocking
//! call; a backend enforces its own timeouts.

mod in_memory;

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::aggregate::{Cart, Order};

pub use in_memory::{InMemoryCartStore, InMemoryOrderStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store lock poisoned ({0})")]
    LockPoisoned(&'static str),
    #[error("stored record could not be (de)serialized: {0}")]
    Serialization(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<bitcode::Error> for StoreError {
    fn from(err: bitcode::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// One cart per user.
pub trait CartStore: Send + Sync {
    fn load_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError>;

    /// Insert or replace the user's cart.
    fn save(&self, cart: &Cart) -> Result<(), StoreError>;

    /// Delete the user's cart. Returns true if it existed.
    fn delete(&self, user_id: Uuid) -> Result<bool, StoreError>;
}

pub trait OrderStore: Send + Sync {
    fn get(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;

    /// All orders, oldest first.
    fn list(&self) -> Result<Vec<Order>, StoreError>;

    fn save(&self, order: &Order) -> Result<(), StoreError>;

    /// Returns true if the order existed.
    fn delete(&self, order_id: Uuid) -> Result<bool, StoreError>;
}

impl<T: CartStore + ?Sized> CartStore for Arc<T> {
    fn load_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError> {
        (**self).load_by_user(user_id)
    }

    fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        (**self).save(cart)
    }

    fn delete(&self, user_id: Uuid) -> Result<bool, StoreError> {
        (**self).delete(user_id)
    }
}

impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    fn get(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        (**self).get(order_id)
    }

    fn list(&self) -> Result<Vec<Order>, StoreError> {
        (**self).list()
    }

    fn save(&self, order: &Order) -> Result<(), StoreError> {
        (**self).save(order)
    }

    fn delete(&self, order_id: Uuid) -> Result<bool, StoreError> {
        (**self).delete(order_id)
    }
}
