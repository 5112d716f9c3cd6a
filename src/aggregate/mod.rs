//! Durable aggregates owned by the cart and order services.
//!
//! These are flat value structs. Persistence goes through the repository
//! traits in [`crate::store`]; there are no back-references between
//! an aggregate and its items.

mod cart;
mod order;

use thiserror::Error;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderItem, OrderStatus, PaymentType};

/// A string that names no variant of a closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value}. Allowed values: {allowed}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub allowed: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str, allowed: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            allowed: allowed.join(", "),
        }
    }
}
