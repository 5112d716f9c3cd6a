//! End-to-end replication across inventory, cart and order nodes.
//!
//! Every node runs its own ingress workers over one shared in-memory bus;
//! assertions wait for the asynchronous hops to land.

#[path = "../support/mod.rs"]
mod support;

mod purchase;
mod stock;
