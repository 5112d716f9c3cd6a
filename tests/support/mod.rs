//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

use storefront_sync::bus::{Bus, InMemoryQueue};
use storefront_sync::{
    CartNode, Config, InMemoryCartStore, InMemoryOrderStore, InventoryNode, OrderNode,
};

pub type TestBus = Bus<InMemoryQueue, InMemoryQueue>;

/// Poll `cond` until it holds or two seconds pass. Returns whether it held.
pub fn eventually(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(2));
    }
}

/// Inventory, cart and order nodes sharing one in-memory bus.
pub struct Storefront {
    pub queue: InMemoryQueue,
    pub inventory: InventoryNode<TestBus>,
    pub carts: CartNode<InMemoryCartStore, TestBus>,
    pub orders: OrderNode<InMemoryOrderStore, TestBus>,
}

impl Storefront {
    pub fn start() -> Self {
        Self::start_with(Config::for_test())
    }

    pub fn start_with(config: Config) -> Self {
        let _ = storefront_sync::telemetry::try_init_tracing();
        let queue = InMemoryQueue::new();
        let bus = Bus::from_queue(queue.clone());
        Self {
            inventory: InventoryNode::start(&config, bus.clone()),
            carts: CartNode::start(&config, bus.clone(), InMemoryCartStore::new()),
            orders: OrderNode::start(&config, bus, InMemoryOrderStore::new()),
            queue,
        }
    }

    pub fn stop(self) {
        self.orders.stop();
        self.carts.stop();
        self.inventory.stop();
    }
}
