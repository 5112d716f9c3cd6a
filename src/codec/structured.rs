//! Structured (tagged JSON) codec shared by cart and order events.

use serde::{Deserialize, Serialize};

use super::{decode_cart_event, decode_envelope, encode_cart_event, DecodeError};
use crate::events::{CartEvent, OrderEvent};

/// Wire format used when publishing cart events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartEventFormat {
    /// `{"type":"CartItemAdded","userId":..,"productId":..,"quantity":..}`
    #[default]
    Tagged,
    /// `CartItemAdded:<userId>:<productId>:<qty>`
    Positional,
}

impl CartEventFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            CartEventFormat::Tagged => "application/json",
            CartEventFormat::Positional => "text/plain",
        }
    }
}

/// Serialize any event as JSON.
pub fn encode_json<T: Serialize>(event: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(event)
}

/// Encode a cart event in the requested format.
pub fn encode_cart_message(
    event: &CartEvent,
    format: CartEventFormat,
) -> Result<Vec<u8>, serde_json::Error> {
    match format {
        CartEventFormat::Tagged => encode_json(event),
        CartEventFormat::Positional => Ok(encode_cart_event(event).into_bytes()),
    }
}

/// Decode a cart event in either format.
///
/// A payload whose first non-blank character is `{` is read as tagged JSON
/// (envelope allowed); anything else is read as a positional string.
pub fn decode_cart_message(raw: &[u8]) -> Result<CartEvent, DecodeError> {
    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
    if text.trim_start().starts_with('{') {
        let event: CartEvent = decode_envelope(raw)?;
        if let CartEvent::CartItemAdded { quantity: 0, .. } = event {
            return Err(DecodeError::InvalidQuantity {
                field: "quantity",
                value: "0".into(),
            });
        }
        Ok(event)
    } else {
        decode_cart_event(text)
    }
}

/// Decode a structured order event (envelope allowed).
pub fn decode_order_event(raw: &[u8]) -> Result<OrderEvent, DecodeError> {
    decode_envelope(raw)
}
