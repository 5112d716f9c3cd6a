//! The stock source of truth.
//!
//! `Inventory` owns product quantities and announces every change on the
//! product channels. It also reacts to orders: a created order takes its
//! quantities out of stock, and a deleted order that was cancelled puts them
//! back. Each resulting stock level is republished as `ProductUpdated`, which
//! is what keeps every [`crate::replica::StockReplica`] current.

mod consumer;

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregate::OrderStatus;
use crate::bus::Publisher;
use crate::egress::EventPublisher;
use crate::events::{OrderLine, ProductChanged, ProductDeleted};
use crate::service::ServiceError;

pub use consumer::OrderStockConsumer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: u32,
}

impl Product {
    fn changed(&self) -> ProductChanged {
        ProductChanged::new(self.product_id, self.quantity).named(self.name.clone())
    }
}

pub struct Inventory<P: Publisher> {
    products: Arc<DashMap<Uuid, Product>>,
    egress: EventPublisher<P>,
}

impl<P: Publisher> Inventory<P> {
    pub fn new(egress: EventPublisher<P>) -> Self {
        Self {
            products: Arc::new(DashMap::new()),
            egress,
        }
    }

    pub fn create_product(&self, name: &str, quantity: u32) -> Result<Product, ServiceError> {
        let product = Product {
            product_id: Uuid::new_v4(),
            name: name.to_string(),
            quantity,
        };
        self.products.insert(product.product_id, product.clone());
        if let Err(err) = self.egress.publish_product_created(&product.changed()) {
            self.products.remove(&product.product_id);
            let err = ServiceError::from(err);
            err.log("create_product");
            return Err(err);
        }

        info!(product_id = %product.product_id, name, quantity, "product created");
        Ok(product)
    }

    /// Set the stock level of a product.
    pub fn update_quantity(&self, product_id: Uuid, quantity: u32) -> Result<Product, ServiceError> {
        self.set_level(product_id, |_| quantity)
            .inspect_err(|err| err.log("update_quantity"))
    }

    pub fn delete_product(&self, product_id: Uuid) -> Result<Product, ServiceError> {
        let result = match self.products.remove(&product_id) {
            Some((_, product)) => {
                let deleted = ProductDeleted {
                    product_id: Some(product_id),
                    name: Some(product.name.clone()),
                };
                match self.egress.publish_product_deleted(&deleted) {
                    Ok(()) => Ok(product),
                    Err(err) => {
                        self.products.insert(product_id, product);
                        Err(ServiceError::from(err))
                    }
                }
            }
            None => Err(ServiceError::ProductNotFound(product_id)),
        };
        if result.is_ok() {
            info!(%product_id, "product deleted");
        }
        result.inspect_err(|err| err.log("delete_product"))
    }

    pub fn get_product(&self, product_id: Uuid) -> Result<Product, ServiceError> {
        self.products
            .get(&product_id)
            .map(|product| product.clone())
            .ok_or(ServiceError::ProductNotFound(product_id))
    }

    pub fn list_products(&self) -> Vec<Product> {
        let mut products: Vec<_> = self.products.iter().map(|p| p.value().clone()).collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    /// Take ordered quantities out of stock, never below zero.
    ///
    /// Unknown products are skipped. Stops at the first publish failure.
    pub fn reserve(&self, items: &[OrderLine]) -> Result<(), ServiceError> {
        for line in items {
            match self.set_level(line.product_id, |q| q.saturating_sub(line.quantity)) {
                Ok(_) => {}
                Err(ServiceError::ProductNotFound(product_id)) => {
                    warn!(%product_id, "ordered product unknown to inventory, skipped");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Put the quantities of a deleted order back, if it had been cancelled.
    pub fn release(&self, status: OrderStatus, items: &[OrderLine]) -> Result<(), ServiceError> {
        if status != OrderStatus::Cancelled {
            info!(%status, "deleted order was not cancelled, stock kept");
            return Ok(());
        }
        for line in items {
            match self.set_level(line.product_id, |q| q.saturating_add(line.quantity)) {
                Ok(_) => {}
                Err(ServiceError::ProductNotFound(product_id)) => {
                    warn!(%product_id, "released product unknown to inventory, skipped");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn set_level(
        &self,
        product_id: Uuid,
        level: impl FnOnce(u32) -> u32,
    ) -> Result<Product, ServiceError> {
        let (previous, product) = {
            let mut entry = self
                .products
                .get_mut(&product_id)
                .ok_or(ServiceError::ProductNotFound(product_id))?;
            let previous = entry.quantity;
            entry.quantity = level(previous);
            info!(%product_id, from = previous, to = entry.quantity, "stock level changed");
            (previous, entry.clone())
        };
        if let Err(err) = self.egress.publish_product_updated(&product.changed()) {
            // only undo our own write, not a level set since
            if let Some(mut entry) = self.products.get_mut(&product_id) {
                if entry.quantity == product.quantity {
                    entry.quantity = previous;
                }
            }
            warn!(%product_id, restored = previous, "stock change rolled back after publish failure");
            return Err(err.into());
        }
        Ok(product)
    }
}
