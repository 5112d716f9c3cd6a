//! Event-driven replication between storefront services.
//!
//! An inventory publishes stock changes, a cart service keeps a stock replica
//! and refuses to oversell against it, and an order service keeps a cart
//! replica built from cart events and turns it into orders. All state crosses
//! service boundaries as events on a [`bus`].

pub mod aggregate;
pub mod bus;
pub mod codec;
pub mod config;
pub mod egress;
pub mod events;
pub mod ingress;
pub mod inventory;
pub mod node;
pub mod pool;
pub mod replica;
pub mod service;
pub mod store;
pub mod telemetry;

pub use aggregate::{Cart, CartItem, Order, OrderItem, OrderStatus, PaymentType};
pub use codec::{CartEventFormat, DecodeError};
pub use config::Config;
pub use egress::EventPublisher;
pub use events::{CartEvent, OrderEvent, OrderLine, ProductChanged, ProductDeleted};
pub use ingress::{Consumer, Disposition, IngressError, IngressStats, IngressWorker};
pub use inventory::{Inventory, Product};
pub use node::{CartNode, InventoryNode, OrderNode};
pub use pool::{PoolError, Ticket, WorkerPool};
pub use replica::{CartReplica, LineItem, StockReplica};
pub use service::{CartService, OrderService, ServiceError};
pub use store::{CartStore, InMemoryCartStore, InMemoryOrderStore, OrderStore, StoreError};
