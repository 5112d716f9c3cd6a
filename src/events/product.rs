//! Stock-change events published by the inventory.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of `ProductCreated` and `ProductUpdated`.
///
/// Only `productId` and `quantity` drive the stock replica; the descriptive
/// fields are carried for downstream consumers and are optional on decode.
/// Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanged {
    pub product_id: Uuid,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductChanged {
    pub fn new(product_id: Uuid, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            name: None,
            category: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Payload of `ProductDeleted`.
///
/// The identifier is optional on the wire so that a null or absent id decodes
/// and can be rejected explicitly instead of failing inside serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDeleted {
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ProductDeleted {
    pub fn new(product_id: Uuid) -> Self {
        Self {
            product_id: Some(product_id),
            name: None,
        }
    }
}
