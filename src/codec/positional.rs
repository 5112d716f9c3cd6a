//! Positional cart event strings: `Kind:userId[:productId[:quantity]]`.
//!
//! Tokens carry no type markers and no escaping, so no token may contain `:`.

use uuid::Uuid;

use super::DecodeError;
use crate::events::CartEvent;

const DELIMITER: char = ':';

/// Encode a cart event in positional form. Field order is fixed per variant.
pub fn encode_cart_event(event: &CartEvent) -> String {
    match event {
        CartEvent::CartItemAdded {
            user_id,
            product_id,
            quantity,
        } => format!("CartItemAdded:{}:{}:{}", user_id, product_id, quantity),
        CartEvent::CartItemRemoved {
            user_id,
            product_id,
        } => format!("CartItemRemoved:{}:{}", user_id, product_id),
        CartEvent::CartItemQuantityChanged {
            user_id,
            product_id,
            new_quantity,
        } => format!(
            "CartItemQuantityChanged:{}:{}:{}",
            user_id, product_id, new_quantity
        ),
        CartEvent::CartCleared { user_id } => format!("CartCleared:{}", user_id),
    }
}

/// Decode a positional cart event string.
pub fn decode_cart_event(raw: &str) -> Result<CartEvent, DecodeError> {
    let tokens: Vec<&str> = raw.trim().split(DELIMITER).collect();
    let (kind, fields) = tokens
        .split_first()
        .ok_or_else(|| DecodeError::UnknownVariant(raw.to_string()))?;

    match *kind {
        "CartItemAdded" => {
            expect_fields("CartItemAdded", fields, 3)?;
            Ok(CartEvent::CartItemAdded {
                user_id: parse_id("userId", fields[0])?,
                product_id: parse_id("productId", fields[1])?,
                quantity: parse_positive_quantity("quantity", fields[2])?,
            })
        }
        "CartItemRemoved" => {
            expect_fields("CartItemRemoved", fields, 2)?;
            Ok(CartEvent::CartItemRemoved {
                user_id: parse_id("userId", fields[0])?,
                product_id: parse_id("productId", fields[1])?,
            })
        }
        "CartItemQuantityChanged" => {
            expect_fields("CartItemQuantityChanged", fields, 3)?;
            Ok(CartEvent::CartItemQuantityChanged {
                user_id: parse_id("userId", fields[0])?,
                product_id: parse_id("productId", fields[1])?,
                new_quantity: parse_quantity("newQuantity", fields[2])?,
            })
        }
        "CartCleared" => {
            expect_fields("CartCleared", fields, 1)?;
            Ok(CartEvent::CartCleared {
                user_id: parse_id("userId", fields[0])?,
            })
        }
        other => Err(DecodeError::UnknownVariant(other.to_string())),
    }
}

fn expect_fields(variant: &'static str, fields: &[&str], expected: usize) -> Result<(), DecodeError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::FieldCount {
            variant,
            expected,
            actual: fields.len(),
        })
    }
}

fn parse_id(field: &'static str, token: &str) -> Result<Uuid, DecodeError> {
    Uuid::parse_str(token).map_err(|_| DecodeError::InvalidId {
        field,
        value: token.to_string(),
    })
}

fn parse_positive_quantity(field: &'static str, token: &str) -> Result<u32, DecodeError> {
    match parse_quantity(field, token)? {
        0 => Err(DecodeError::InvalidQuantity {
            field,
            value: token.to_string(),
        }),
        quantity => Ok(quantity),
    }
}

fn parse_quantity(field: &'static str, token: &str) -> Result<u32, DecodeError> {
    token.parse::<u32>().map_err(|_| DecodeError::InvalidQuantity {
        field,
        value: token.to_string(),
    })
}
