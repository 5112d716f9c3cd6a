//! Domain events exchanged between the inventory, cart and order services.
//!
//! Only these payloads cross service boundaries; no aggregate is ever shared
//! by reference.

mod cart;
mod order;
mod product;

pub use cart::CartEvent;
pub use order::{OrderEvent, OrderLine};
pub use product::{ProductChanged, ProductDeleted};

/// Default channel names.
pub mod channels {
    pub const PRODUCT_CREATED: &str = "product-created";
    pub const PRODUCT_UPDATED: &str = "product-updated";
    pub const PRODUCT_DELETED: &str = "product-deleted";
    pub const CART_EVENTS: &str = "cart-events";
    pub const ORDER_CREATED: &str = "order-created-events";
    pub const ORDER_UPDATED: &str = "order-updated-events";
    pub const ORDER_DELETED: &str = "order-deleted-events";
}
