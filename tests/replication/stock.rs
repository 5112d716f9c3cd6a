//! Inventory → StockReplica.

use storefront_sync::events::channels;
use storefront_sync::ServiceError;

use crate::support::{eventually, Storefront};

#[test]
fn created_updated_and_deleted_products_reach_the_cart_node() {
    let shop = Storefront::start();
    let inventory = shop.inventory.inventory();
    let stock = shop.carts.stock().clone();

    let lamp = inventory.create_product("lamp", 5).unwrap();
    assert!(eventually(|| stock.get_stock(lamp.product_id) == Some(5)));

    inventory.update_quantity(lamp.product_id, 2).unwrap();
    assert!(eventually(|| stock.get_stock(lamp.product_id) == Some(2)));

    inventory.delete_product(lamp.product_id).unwrap();
    assert!(eventually(|| stock.get_stock(lamp.product_id).is_none()));

    assert!(shop.queue.dead_letters().is_empty());
    shop.stop();
}

#[test]
fn add_item_waits_for_replicated_stock() {
    let shop = Storefront::start();
    let inventory = shop.inventory.inventory();
    let carts = shop.carts.service();
    let user = uuid::Uuid::new_v4();

    let lamp = inventory.create_product("lamp", 1).unwrap();
    assert!(eventually(|| shop.carts.stock().get_stock(lamp.product_id) == Some(1)));

    carts.add_item(user, lamp.product_id, 1).unwrap();
    assert!(matches!(
        carts.add_item(user, lamp.product_id, 1),
        Err(ServiceError::ProductUnavailable { .. })
    ));

    inventory.update_quantity(lamp.product_id, 3).unwrap();
    assert!(eventually(|| shop.carts.stock().get_stock(lamp.product_id) == Some(3)));
    assert_eq!(carts.add_item(user, lamp.product_id, 2).unwrap().quantity_of(lamp.product_id), 3);
    shop.stop();
}

#[test]
fn malformed_product_events_are_dead_lettered() {
    use storefront_sync::bus::{Event, Publisher};

    let shop = Storefront::start();
    shop.queue
        .publish(
            channels::PRODUCT_DELETED,
            Event::with_string_payload("bad-1", "ProductDeleted", r#"{"productId":null}"#),
        )
        .unwrap();
    shop.queue
        .publish(
            channels::PRODUCT_UPDATED,
            Event::with_string_payload("bad-2", "ProductUpdated", "not json"),
        )
        .unwrap();

    assert!(eventually(|| shop.queue.dead_letters().len() == 2));
    assert!(shop.carts.stock().is_empty());
    shop.stop();
}
