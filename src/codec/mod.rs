//! Wire codecs for the event formats used between services.
//!
//! Two formats are in use:
//! - a structured JSON format, optionally wrapped in an outer envelope field
//!   (see [`decode_envelope`]);
//! - a compact positional string format for cart events
//!   (`Kind:field1:field2:...`, see [`decode_cart_event`]).
//!
//! Cart events are now published as tagged JSON by default; the positional
//! form stays decodable for producers that have not switched yet.
//! All functions here are pure.

mod envelope;
mod positional;
mod structured;

use thiserror::Error;

pub use envelope::{decode_envelope, wrap_envelope, ENVELOPE_FIELD};
pub use positional::{decode_cart_event, encode_cart_event};
pub use structured::{
    decode_cart_message, decode_order_event, encode_cart_message, encode_json, CartEventFormat,
};

/// A payload that cannot be turned into the expected event shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("malformed JSON payload: {0}")]
    Json(String),
    #[error("unknown event variant: {0:?}")]
    UnknownVariant(String),
    #[error("{variant} expects {expected} fields, got {actual}")]
    FieldCount {
        variant: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid identifier in {field}: {value:?}")]
    InvalidId { field: &'static str, value: String },
    #[error("invalid quantity in {field}: {value:?}")]
    InvalidQuantity { field: &'static str, value: String },
    #[error("missing identifier: {0}")]
    MissingIdentifier(&'static str),
    #[error("unexpected event type {actual}, expected {expected}")]
    UnexpectedType {
        expected: &'static str,
        actual: &'static str,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}
