//! Cart → order → inventory → cart, the full loop.

use storefront_sync::codec::decode_order_event;
use storefront_sync::events::channels;
use storefront_sync::{OrderEvent, OrderStatus};
use uuid::Uuid;

use crate::support::{eventually, Storefront};

#[test]
fn purchase_flows_through_every_node() {
    let shop = Storefront::start();
    let inventory = shop.inventory.inventory();
    let carts = shop.carts.service();
    let orders = shop.orders.service();
    let user = Uuid::new_v4();

    let lamp = inventory.create_product("lamp", 5).unwrap();
    assert!(eventually(|| shop.carts.stock().get_stock(lamp.product_id) == Some(5)));

    carts.add_item(user, lamp.product_id, 3).unwrap();
    assert!(eventually(|| shop.orders.carts().snapshot_cart(user).len() == 1));

    let order = orders.create_order(user, "1 Main St", "card").unwrap();
    assert_eq!(order.items().len(), 1);
    assert_eq!(order.items()[0].quantity, 3);

    // inventory reserved the stock and the replica caught up
    assert!(eventually(|| shop.carts.stock().get_stock(lamp.product_id) == Some(2)));
    assert_eq!(inventory.get_product(lamp.product_id).unwrap().quantity, 2);

    // the cart node cleared the cart, and the order node saw it
    assert!(eventually(|| carts.get_cart(user).unwrap().is_empty()));
    assert!(eventually(|| shop.orders.carts().snapshot_cart(user).is_empty()));

    let published = shop.queue.events(channels::ORDER_CREATED);
    assert_eq!(published.len(), 1);
    assert!(matches!(
        decode_order_event(&published[0].payload).unwrap(),
        OrderEvent::OrderCreated { user_id, .. } if user_id == user
    ));
    assert!(shop.queue.dead_letters().is_empty());
    shop.stop();
}

#[test]
fn cancelled_then_deleted_order_restores_stock() {
    let shop = Storefront::start();
    let inventory = shop.inventory.inventory();
    let carts = shop.carts.service();
    let orders = shop.orders.service();
    let user = Uuid::new_v4();

    let lamp = inventory.create_product("lamp", 4).unwrap();
    assert!(eventually(|| shop.carts.stock().get_stock(lamp.product_id) == Some(4)));
    carts.add_item(user, lamp.product_id, 4).unwrap();
    assert!(eventually(|| !shop.orders.carts().snapshot_cart(user).is_empty()));

    let order = orders.create_order(user, "1 Main St", "cash").unwrap();
    assert!(eventually(|| shop.carts.stock().get_stock(lamp.product_id) == Some(0)));

    orders.update_order_status(order.order_id, "cancelled").unwrap();
    let deleted = orders.delete_order(order.order_id).unwrap();
    assert_eq!(deleted.status, OrderStatus::Cancelled);

    assert!(eventually(|| shop.carts.stock().get_stock(lamp.product_id) == Some(4)));
    shop.stop();
}

#[test]
fn delivered_order_deletion_keeps_stock() {
    let shop = Storefront::start();
    let inventory = shop.inventory.inventory();
    let carts = shop.carts.service();
    let orders = shop.orders.service();
    let user = Uuid::new_v4();

    let lamp = inventory.create_product("lamp", 4).unwrap();
    assert!(eventually(|| shop.carts.stock().get_stock(lamp.product_id) == Some(4)));
    carts.add_item(user, lamp.product_id, 1).unwrap();
    assert!(eventually(|| !shop.orders.carts().snapshot_cart(user).is_empty()));

    let order = orders.create_order(user, "x", "paypal").unwrap();
    assert!(eventually(|| shop.carts.stock().get_stock(lamp.product_id) == Some(3)));

    orders.update_order_status(order.order_id, "DELIVERED").unwrap();
    orders.delete_order(order.order_id).unwrap();

    assert!(eventually(|| shop.queue.events(channels::ORDER_DELETED).len() == 1));
    let deleted = shop.queue.events(channels::ORDER_DELETED)[0].id.clone();
    // acked only after the inventory consumer has applied it
    assert!(eventually(|| shop.queue.acknowledged().contains(&deleted)));
    assert_eq!(inventory.get_product(lamp.product_id).unwrap().quantity, 3);
    shop.stop();
}
