//! Runs inventory, cart and order nodes in one process over an in-memory bus
//! and walks one purchase through them.
//!
//! Usage: `storefront-demo [config.yaml]`

use std::error::Error;
use std::time::{Duration, Instant};

use tracing::info;

use storefront_sync::bus::{Bus, InMemoryQueue};
use storefront_sync::telemetry::init_tracing;
use storefront_sync::{CartNode, Config, InMemoryCartStore, InMemoryOrderStore, InventoryNode, OrderNode};
use uuid::Uuid;

fn wait_until(what: &str, cond: impl Fn() -> bool) -> Result<(), Box<dyn Error>> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        if Instant::now() >= deadline {
            return Err(format!("timed out waiting for {}", what).into());
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let path = std::env::args().nth(1);
    let config = Config::load(path.as_deref())?;

    let bus = Bus::from_queue(InMemoryQueue::new());
    let inventory_node = InventoryNode::start(&config, bus.clone());
    let cart_node = CartNode::start(&config, bus.clone(), InMemoryCartStore::new());
    let order_node = OrderNode::start(&config, bus, InMemoryOrderStore::new());

    let inventory = inventory_node.inventory();
    let lamp = inventory.create_product("desk lamp", 5)?;
    wait_until("stock replica", || {
        cart_node.stock().get_stock(lamp.product_id) == Some(5)
    })?;

    let user = Uuid::new_v4();
    let carts = cart_node.service();
    let cart = cart_node
        .pool()
        .submit(move || carts.add_item(user, lamp.product_id, 3))?
        .wait()??;
    info!(cart_id = %cart.cart_id, lines = cart.items.len(), "cart filled");

    wait_until("cart replica", || !order_node.carts().snapshot_cart(user).is_empty())?;

    let orders = order_node.service();
    let order = order_node
        .pool()
        .submit(move || orders.create_order(user, "1 Main St", "card"))?
        .wait()??;
    info!(order_id = %order.order_id, status = %order.status, "order placed");

    wait_until("stock decrement", || {
        cart_node.stock().get_stock(lamp.product_id) == Some(2)
    })?;
    wait_until("cart cleared", || order_node.carts().snapshot_cart(user).is_empty())?;

    info!(
        stock = ?cart_node.stock().get_stock(lamp.product_id),
        orders = order_node.service().get_all_orders()?.len(),
        "purchase replicated"
    );

    let stats = [order_node.stop(), cart_node.stop(), inventory_node.stop()];
    let acked: usize = stats.iter().map(|s| s.acked).sum();
    let nacked: usize = stats.iter().map(|s| s.nacked).sum();
    info!(acked, nacked, "nodes stopped");
    Ok(())
}
