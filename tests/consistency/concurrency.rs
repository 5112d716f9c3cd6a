use std::sync::Arc;

use storefront_sync::bus::InMemoryQueue;
use storefront_sync::events::channels;
use storefront_sync::{
    CartService, Config, EventPublisher, InMemoryCartStore, ServiceError, StockReplica, WorkerPool,
};
use uuid::Uuid;

use crate::support::{eventually, Storefront};

#[test]
fn pooled_adds_for_many_users() {
    let queue = InMemoryQueue::new();
    let carts = Arc::new(CartService::new(
        InMemoryCartStore::new(),
        StockReplica::new(),
        EventPublisher::new(queue.clone()),
    ));
    let product = Uuid::new_v4();
    carts.stock().upsert_stock(product, 2);
    let pool = WorkerPool::new(4);

    let users: Vec<_> = (0..40).map(|_| Uuid::new_v4()).collect();
    let tickets: Vec<_> = users
        .iter()
        .map(|&user| {
            let carts = Arc::clone(&carts);
            pool.submit(move || carts.add_item(user, product, 2)).unwrap()
        })
        .collect();

    // the guard is per cart, so every user may take the whole stock figure
    for ticket in tickets {
        assert_eq!(ticket.wait().unwrap().unwrap().quantity_of(product), 2);
    }
    assert_eq!(queue.events(channels::CART_EVENTS).len(), 40);
    for user in users {
        assert_eq!(carts.get_cart(user).unwrap().quantity_of(product), 2);
    }
}

#[test]
fn stock_changes_race_with_adds_without_tearing() {
    let queue = InMemoryQueue::new();
    let carts = Arc::new(CartService::new(
        InMemoryCartStore::new(),
        StockReplica::new(),
        EventPublisher::new(queue.clone()),
    ));
    let product = Uuid::new_v4();
    carts.stock().upsert_stock(product, 0);

    let writer = {
        let stock = carts.stock().clone();
        std::thread::spawn(move || {
            for level in 0..500u32 {
                stock.upsert_stock(product, level % 2);
            }
        })
    };

    let pool = WorkerPool::new(4);
    let tickets: Vec<_> = (0..100)
        .map(|_| {
            let carts = Arc::clone(&carts);
            pool.submit(move || carts.add_item(Uuid::new_v4(), product, 1)).unwrap()
        })
        .collect();

    for ticket in tickets {
        match ticket.wait().unwrap() {
            Ok(cart) => assert_eq!(cart.quantity_of(product), 1),
            Err(ServiceError::ProductUnavailable { available, .. }) => {
                assert_eq!(available, Some(0))
            }
            Err(other) => panic!("unexpected {:?}", other),
        }
    }
    writer.join().unwrap();
}

#[test]
fn competing_ingress_workers_keep_replicas_consistent() {
    let mut config = Config::for_test();
    config.bus.workers_per_channel = 3;
    let shop = Storefront::start_with(config);
    let inventory = shop.inventory.inventory();
    let carts = shop.carts.service();

    let products: Vec<_> = (0..10)
        .map(|i| inventory.create_product(&format!("p{}", i), 100).unwrap())
        .collect();
    assert!(eventually(|| shop.carts.stock().len() == products.len()));

    let user = Uuid::new_v4();
    let tickets: Vec<_> = products
        .iter()
        .map(|product| {
            let carts = Arc::clone(&carts);
            let product_id = product.product_id;
            shop.carts
                .pool()
                .submit(move || carts.add_item(user, product_id, 1))
                .unwrap()
        })
        .collect();
    for ticket in tickets {
        ticket.wait().unwrap().unwrap();
    }

    // every add was published, so the order side sees all ten lines even if
    // concurrent saves of the same durable cart overwrote each other
    assert!(eventually(|| shop.orders.carts().snapshot_cart(user).len() == products.len()));
    let durable = carts.get_cart(user).unwrap().items.len();
    assert!((1..=products.len()).contains(&durable));
    assert!(shop.queue.dead_letters().is_empty());

    shop.stop();
}
