use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

/// Available quantity per product, as last reported by the inventory.
///
/// Clone-friendly via Arc; every clone sees the same entries.
#[derive(Clone, Default)]
pub struct StockReplica {
    levels: Arc<DashMap<Uuid, u32>>,
}

impl StockReplica {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the available quantity for a product, replacing any previous value.
    pub fn upsert_stock(&self, product_id: Uuid, quantity: u32) {
        let previous = self.levels.insert(product_id, quantity);
        info!(%product_id, quantity, ?previous, "stock replica updated");
    }

    /// Forget a product. Returns the quantity it had, if any.
    pub fn remove_stock(&self, product_id: Uuid) -> Option<u32> {
        let removed = self.levels.remove(&product_id).map(|(_, quantity)| quantity);
        info!(%product_id, ?removed, "stock replica entry removed");
        removed
    }

    pub fn get_stock(&self, product_id: Uuid) -> Option<u32> {
        self.levels.get(&product_id).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
