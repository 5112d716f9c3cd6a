//! Read-replicas of state owned by other services.
//!
//! ```text
//!  product-* channels ──► StockReplica   (productId → available quantity)
//!  cart-events        ──► CartReplica    (userId    → [LineItem])
//! ```
//!
//! Replicas are written only by ingress consumers and read by the business
//! layer. Both are sharded concurrent maps, so writers for different keys
//! never contend and a reader never sees a half-applied event. Neither keeps
//! versions: the last write wins.

mod cart;
mod stock;

pub use cart::{CartReplica, LineItem};
pub use stock::StockReplica;
