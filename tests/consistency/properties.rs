use storefront_sync::codec::{decode_cart_event, encode_cart_event};
use storefront_sync::{CartEvent, CartReplica, StockReplica};
use uuid::Uuid;

/// Small deterministic generator so failures replay.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

fn random_event(rng: &mut Lcg, users: &[Uuid], products: &[Uuid]) -> CartEvent {
    let user_id = users[rng.next(users.len() as u64) as usize];
    let product_id = products[rng.next(products.len() as u64) as usize];
    match rng.next(10) {
        0..=4 => CartEvent::CartItemAdded {
            user_id,
            product_id,
            quantity: rng.next(5) as u32 + 1,
        },
        5 | 6 => CartEvent::CartItemRemoved {
            user_id,
            product_id,
        },
        7 | 8 => CartEvent::CartItemQuantityChanged {
            user_id,
            product_id,
            new_quantity: rng.next(4) as u32,
        },
        _ => CartEvent::CartCleared { user_id },
    }
}

#[test]
fn positional_round_trip_for_every_variant() {
    let mut rng = Lcg(7);
    let users: Vec<_> = (0..3).map(|_| Uuid::new_v4()).collect();
    let products: Vec<_> = (0..3).map(|_| Uuid::new_v4()).collect();

    for _ in 0..200 {
        let event = random_event(&mut rng, &users, &products);
        assert_eq!(decode_cart_event(&encode_cart_event(&event)).unwrap(), event);
    }
}

#[test]
fn stock_upsert_twice_equals_once() {
    let once = StockReplica::new();
    let twice = StockReplica::new();
    let product = Uuid::new_v4();

    once.upsert_stock(product, 11);
    twice.upsert_stock(product, 11);
    twice.upsert_stock(product, 11);

    assert_eq!(once.get_stock(product), twice.get_stock(product));
    assert_eq!(once.len(), twice.len());
}

#[test]
fn cart_item_added_twice_doubles() {
    let replica = CartReplica::new();
    let (user, product) = (Uuid::new_v4(), Uuid::new_v4());
    let event = CartEvent::CartItemAdded {
        user_id: user,
        product_id: product,
        quantity: 3,
    };

    replica.apply_cart_event(&event);
    replica.apply_cart_event(&event);

    assert_eq!(replica.snapshot_cart(user)[0].quantity, 6);
}

#[test]
fn every_reachable_line_is_positive() {
    let mut rng = Lcg(42);
    let users: Vec<_> = (0..4).map(|_| Uuid::new_v4()).collect();
    let products: Vec<_> = (0..5).map(|_| Uuid::new_v4()).collect();
    let replica = CartReplica::new();

    for _ in 0..2_000 {
        replica.apply_cart_event(&random_event(&mut rng, &users, &products));
        for user in &users {
            let lines = replica.snapshot_cart(*user);
            assert!(lines.iter().all(|line| line.quantity > 0), "{:?}", lines);
            let mut ids: Vec<_> = lines.iter().map(|line| line.product_id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), lines.len(), "duplicate line for one product");
        }
    }
}
