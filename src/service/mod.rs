//! Business operations.
//!
//! ```text
//!  StockReplica ──► CartService  ──► CartStore  + cart-events
//!  CartReplica  ──► OrderService ──► OrderStore + order-*-events
//! ```
//!
//! Every operation is a plain synchronous call returning the affected
//! aggregate or a [`ServiceError`]. Run them on a [`crate::pool::WorkerPool`]
//! to execute them off the caller's thread.

mod cart;
mod error;
mod order;

pub use cart::CartService;
pub use error::{ServiceError, INTERNAL_MESSAGE};
pub use order::OrderService;
