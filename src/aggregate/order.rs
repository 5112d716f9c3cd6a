use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnknownVariant;
use crate::events::OrderLine;

/// Order lifecycle states. Every order starts `PENDING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| UnknownVariant::new("order status", s, &Self::ALL.map(|v| v.as_str())))
    }
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    Card,
    Cash,
    Paypal,
}

impl PaymentType {
    pub const ALL: [PaymentType; 3] = [PaymentType::Card, PaymentType::Cash, PaymentType::Paypal];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Card => "CARD",
            PaymentType::Cash => "CASH",
            PaymentType::Paypal => "PAYPAL",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = UnknownVariant;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|payment| payment.as_str() == wanted)
            .ok_or_else(|| UnknownVariant::new("payment type", s, &Self::ALL.map(|v| v.as_str())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// The durable order aggregate.
///
/// The item list is copied from a cart snapshot when the order is placed and
/// never changes afterwards; only `status` moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub payment_type: PaymentType,
    pub created_at: DateTime<Utc>,
    items: Vec<OrderItem>,
}

impl Order {
    /// Place a new `PENDING` order.
    pub fn place(
        user_id: Uuid,
        delivery_address: impl Into<String>,
        payment_type: PaymentType,
        items: Vec<OrderItem>,
    ) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            user_id,
            status: OrderStatus::Pending,
            delivery_address: delivery_address.into(),
            payment_type,
            created_at: Utc::now(),
            items,
        }
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Items in their event form.
    pub fn lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect()
    }
}
