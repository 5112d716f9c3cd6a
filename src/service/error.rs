//! Error type for business operations.

use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::aggregate::UnknownVariant;
use crate::bus::PublishError;
use crate::store::StoreError;

/// Message shown to callers for every server-side failure.
pub const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Stock is unknown, or lower than the quantity the cart would hold.
    #[error("product {product_id} is unavailable: cart would hold {requested}, stock is {}", stock_label(.available))]
    ProductUnavailable {
        product_id: Uuid,
        requested: u64,
        available: Option<u32>,
    },
    #[error("product {product_id} is not in the cart of user {user_id}")]
    CartItemNotFound { user_id: Uuid, product_id: Uuid },
    #[error("order {0} not found")]
    OrderNotFound(Uuid),
    #[error("product {0} not found")]
    ProductNotFound(Uuid),
    #[error("cart of user {0} is empty")]
    EmptyCart(Uuid),
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i64),
    #[error("{0}")]
    InvalidPaymentType(UnknownVariant),
    #[error("{0}")]
    InvalidStatus(UnknownVariant),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),
    #[error("internal error: {0}")]
    Internal(String),
}

fn stock_label(available: &Option<u32>) -> String {
    available.map_or_else(|| "unknown".to_string(), |q| q.to_string())
}

impl ServiceError {
    /// HTTP-style status for the request layer.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::ProductUnavailable { .. }
            | ServiceError::EmptyCart(_)
            | ServiceError::InvalidQuantity(_)
            | ServiceError::InvalidPaymentType(_)
            | ServiceError::InvalidStatus(_) => 400,
            ServiceError::CartItemNotFound { .. }
            | ServiceError::OrderNotFound(_)
            | ServiceError::ProductNotFound(_) => 404,
            ServiceError::Store(_) | ServiceError::Publish(_) | ServiceError::Internal(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Text safe to return to a caller. Server-side details stay in the logs.
    pub fn client_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            INTERNAL_MESSAGE.to_string()
        }
    }

    /// Log a failed operation: rejections at warn, internal failures at error.
    pub(crate) fn log(&self, operation: &'static str) {
        if self.is_client_error() {
            warn!(operation, error = %self, "operation rejected");
        } else {
            error!(operation, error = ?self, "operation failed");
        }
    }
}
