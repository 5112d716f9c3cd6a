use std::time::Duration;

use storefront_sync::bus::{Event, InMemoryQueue, Publisher, Subscribable};
use storefront_sync::codec::{decode_cart_message, decode_order_event, encode_cart_event};
use storefront_sync::events::{channels, OrderLine};
use storefront_sync::ingress::{CartEventConsumer, IngressWorker};
use storefront_sync::{
    CartEvent, CartReplica, CartService, EventPublisher, InMemoryCartStore, InMemoryOrderStore,
    OrderEvent, OrderService, ServiceError, StockReplica,
};
use uuid::Uuid;

use crate::support::eventually;

fn cart_service(queue: &InMemoryQueue) -> CartService<InMemoryCartStore, InMemoryQueue> {
    CartService::new(
        InMemoryCartStore::new(),
        StockReplica::new(),
        EventPublisher::new(queue.clone()),
    )
}

fn cart_events(queue: &InMemoryQueue) -> Vec<CartEvent> {
    queue
        .events(channels::CART_EVENTS)
        .iter()
        .map(|event| decode_cart_message(&event.payload).unwrap())
        .collect()
}

#[test]
fn second_add_over_stock_is_refused() {
    let queue = InMemoryQueue::new();
    let carts = cart_service(&queue);
    let (user, product_a) = (Uuid::new_v4(), Uuid::new_v4());
    carts.stock().upsert_stock(product_a, 5);

    let cart = carts.add_item(user, product_a, 3).unwrap();
    assert_eq!(cart.quantity_of(product_a), 3);
    assert_eq!(cart.items.len(), 1);

    let err = carts.add_item(user, product_a, 3).unwrap_err();
    assert!(matches!(err, ServiceError::ProductUnavailable { .. }));
    assert_eq!(err.status_code(), 400);
    assert_eq!(carts.get_cart(user).unwrap().quantity_of(product_a), 3);
    assert_eq!(cart_events(&queue).len(), 1);
}

#[test]
fn change_quantity_to_zero_removes_the_line() {
    let queue = InMemoryQueue::new();
    let carts = cart_service(&queue);
    let (user, product_a) = (Uuid::new_v4(), Uuid::new_v4());
    carts.stock().upsert_stock(product_a, 5);
    carts.add_item(user, product_a, 3).unwrap();

    let cart = carts.change_quantity(user, product_a, -3).unwrap();

    assert!(cart.items.is_empty());
    assert_eq!(
        cart_events(&queue).last(),
        Some(&CartEvent::CartItemRemoved {
            user_id: user,
            product_id: product_a
        })
    );
}

#[test]
fn malformed_cart_event_is_nacked_and_ignored() {
    let queue = InMemoryQueue::new();
    let replica = CartReplica::new();
    let worker = IngressWorker::spawn(
        CartEventConsumer::new(replica.clone()),
        queue.subscribe(channels::CART_EVENTS),
        Duration::from_millis(5),
    );

    queue
        .publish(
            channels::CART_EVENTS,
            Event::with_string_payload("bad", "CartItemAdded", "CartItemAdded:not-a-uuid"),
        )
        .unwrap();

    assert!(eventually(|| queue.dead_letters().len() == 1));
    let stats = worker.stop();

    assert_eq!(stats.nacked, 1);
    assert_eq!(stats.acked, 0);
    assert!(queue.acknowledged().is_empty());
    assert!(replica.is_empty());
}

#[test]
fn redelivered_add_is_applied_twice() {
    let queue = InMemoryQueue::new();
    let replica = CartReplica::new();
    let worker = IngressWorker::spawn(
        CartEventConsumer::new(replica.clone()),
        queue.subscribe(channels::CART_EVENTS),
        Duration::from_millis(5),
    );
    let (user, product) = (Uuid::new_v4(), Uuid::new_v4());
    let added = CartEvent::CartItemAdded {
        user_id: user,
        product_id: product,
        quantity: 2,
    };

    queue
        .publish(
            channels::CART_EVENTS,
            Event::with_string_payload("add-1", "CartItemAdded", encode_cart_event(&added)),
        )
        .unwrap();
    assert!(eventually(|| replica.snapshot_cart(user).len() == 1));
    assert!(queue.redeliver(channels::CART_EVENTS, "add-1").unwrap());

    assert!(eventually(|| replica.snapshot_cart(user)[0].quantity == 4));
    assert_eq!(worker.stop().acked, 2);
}

#[test]
fn order_creation_needs_a_replicated_cart() {
    let queue = InMemoryQueue::new();
    let orders = OrderService::new(
        InMemoryOrderStore::new(),
        CartReplica::new(),
        EventPublisher::new(queue.clone()),
    );
    let (user, product_a) = (Uuid::new_v4(), Uuid::new_v4());

    assert!(matches!(
        orders.create_order(user, "1 Main St", "CARD"),
        Err(ServiceError::EmptyCart(_))
    ));
    assert!(queue.events(channels::ORDER_CREATED).is_empty());

    orders.carts().apply_cart_event(&CartEvent::CartItemAdded {
        user_id: user,
        product_id: product_a,
        quantity: 3,
    });
    let order = orders.create_order(user, "1 Main St", "CARD").unwrap();

    let published = queue.events(channels::ORDER_CREATED);
    assert_eq!(published.len(), 1);
    assert_eq!(
        decode_order_event(&published[0].payload).unwrap(),
        OrderEvent::OrderCreated {
            order_id: order.order_id,
            user_id: user,
            items: vec![OrderLine {
                product_id: product_a,
                quantity: 3
            }],
        }
    );
}
