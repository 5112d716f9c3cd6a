//! Composition roots: one node per service, wired from a [`Config`].
//!
//! ```text
//!  InventoryNode ──product-*──► CartNode ──cart-events──► OrderNode
//!        ▲                         ▲                          │
//!        └──────── order-created / order-deleted ─────────────┘
//! ```
//!
//! Each node builds its replicas, services and egress as plain values,
//! starts `bus.workers_per_channel` ingress workers per subscription and
//! owns a [`WorkerPool`] for business operations. Dropping a node signals its
//! workers to stop; [`stop`](CartNode::stop) also waits for them.

use std::sync::Arc;

use tracing::info;

use crate::bus::{Publisher, Subscribable};
use crate::config::Config;
use crate::egress::EventPublisher;
use crate::ingress::{
    CartEventConsumer, Consumer, IngressStats, IngressWorker, OrderCreatedConsumer, StockConsumer,
};
use crate::inventory::{Inventory, OrderStockConsumer};
use crate::pool::WorkerPool;
use crate::replica::{CartReplica, StockReplica};
use crate::service::{CartService, OrderService};
use crate::store::{CartStore, OrderStore};

/// Bus handle a node can publish to and subscribe from.
pub trait NodeBus: Publisher + Subscribable + Clone + 'static {}

impl<T: Publisher + Subscribable + Clone + 'static> NodeBus for T {}

struct Workers(Vec<IngressWorker>);

impl Workers {
    fn new() -> Self {
        Workers(Vec::new())
    }

    fn start<B, C>(&mut self, bus: &B, channel: &str, consumer: C, config: &Config)
    where
        B: Subscribable,
        C: Consumer + 'static,
    {
        let consumer = Arc::new(consumer);
        let subscription = bus.subscribe(channel);
        for _ in 0..config.bus.workers_per_channel.max(1) {
            self.0.push(IngressWorker::spawn(
                Arc::clone(&consumer),
                subscription.clone(),
                config.bus.poll_interval(),
            ));
        }
        info!(
            channel,
            consumer = consumer.name(),
            workers = config.bus.workers_per_channel.max(1),
            "subscribed"
        );
    }

    fn stop(self) -> IngressStats {
        for worker in &self.0 {
            worker.signal_stop();
        }
        self.0
            .into_iter()
            .map(IngressWorker::stop)
            .fold(IngressStats::default(), |mut total, stats| {
                total.acked += stats.acked;
                total.nacked += stats.nacked;
                total.polls += stats.polls;
                total.bus_errors += stats.bus_errors;
                total
            })
    }
}

/// Cart service: replicates stock, guards cart mutations, clears carts once
/// an order is created.
pub struct CartNode<S: CartStore + 'static, B: NodeBus> {
    stock: StockReplica,
    service: Arc<CartService<S, B>>,
    pool: WorkerPool,
    workers: Workers,
}

impl<S: CartStore + 'static, B: NodeBus> CartNode<S, B> {
    pub fn start(config: &Config, bus: B, store: S) -> Self {
        let stock = StockReplica::new();
        let egress = EventPublisher::from_config(bus.clone(), config);
        let service = Arc::new(CartService::new(store, stock.clone(), egress));
        let channels = &config.channels;

        let mut workers = Workers::new();
        workers.start(&bus, &channels.product_created, StockConsumer::upserts(stock.clone()), config);
        workers.start(&bus, &channels.product_updated, StockConsumer::upserts(stock.clone()), config);
        workers.start(&bus, &channels.product_deleted, StockConsumer::removals(stock.clone()), config);
        workers.start(
            &bus,
            &channels.order_created,
            OrderCreatedConsumer::new(Arc::clone(&service)),
            config,
        );

        info!(service = %config.service_name, "cart node started");
        Self {
            stock,
            service,
            pool: WorkerPool::new(config.pool.workers),
            workers,
        }
    }

    pub fn stock(&self) -> &StockReplica {
        &self.stock
    }

    pub fn service(&self) -> Arc<CartService<S, B>> {
        Arc::clone(&self.service)
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Stop every ingress worker and return their combined stats.
    pub fn stop(self) -> IngressStats {
        let stats = self.workers.stop();
        self.pool.shutdown();
        stats
    }
}

/// Order service: replicates carts and turns them into orders.
pub struct OrderNode<S: OrderStore + 'static, B: NodeBus> {
    carts: CartReplica,
    service: Arc<OrderService<S, B>>,
    pool: WorkerPool,
    workers: Workers,
}

impl<S: OrderStore + 'static, B: NodeBus> OrderNode<S, B> {
    pub fn start(config: &Config, bus: B, store: S) -> Self {
        let carts = CartReplica::new();
        let egress = EventPublisher::from_config(bus.clone(), config);
        let service = Arc::new(OrderService::new(store, carts.clone(), egress));

        let mut workers = Workers::new();
        workers.start(
            &bus,
            &config.channels.cart_events,
            CartEventConsumer::new(carts.clone()),
            config,
        );

        info!(service = %config.service_name, "order node started");
        Self {
            carts,
            service,
            pool: WorkerPool::new(config.pool.workers),
            workers,
        }
    }

    pub fn carts(&self) -> &CartReplica {
        &self.carts
    }

    pub fn service(&self) -> Arc<OrderService<S, B>> {
        Arc::clone(&self.service)
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn stop(self) -> IngressStats {
        let stats = self.workers.stop();
        self.pool.shutdown();
        stats
    }
}

/// Inventory: owns stock and follows order creation and deletion.
pub struct InventoryNode<B: NodeBus> {
    inventory: Arc<Inventory<B>>,
    workers: Workers,
}

impl<B: NodeBus> InventoryNode<B> {
    pub fn start(config: &Config, bus: B) -> Self {
        let inventory = Arc::new(Inventory::new(EventPublisher::from_config(bus.clone(), config)));
        let consumer = OrderStockConsumer::new(Arc::clone(&inventory));

        let mut workers = Workers::new();
        workers.start(&bus, &config.channels.order_created, consumer.clone(), config);
        workers.start(&bus, &config.channels.order_deleted, consumer, config);

        info!(service = %config.service_name, "inventory node started");
        Self {
            inventory,
            workers,
        }
    }

    pub fn inventory(&self) -> Arc<Inventory<B>> {
        Arc::clone(&self.inventory)
    }

    pub fn stop(self) -> IngressStats {
        self.workers.stop()
    }
}
