use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::DecodeError;

/// Name of the optional outer field carrying the real payload.
pub const ENVELOPE_FIELD: &str = "message";

/// Decode a structured message, unwrapping the envelope when present.
///
/// If the top-level object has an [`ENVELOPE_FIELD`] holding a nested object,
/// that object is the payload. Otherwise the whole message is the payload.
pub fn decode_envelope<T: DeserializeOwned>(raw: &[u8]) -> Result<T, DecodeError> {
    let root: Value = serde_json::from_slice(raw)?;
    let nested = root
        .get(ENVELOPE_FIELD)
        .filter(|inner| inner.is_object())
        .cloned();
    let payload = nested.unwrap_or(root);
    Ok(serde_json::from_value(payload)?)
}

/// Serialize a payload inside an envelope: `{"messageType":[..],"message":{..}}`.
pub fn wrap_envelope<T: Serialize>(
    message_type: &str,
    payload: &T,
) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&json!({
        "messageType": [format!("urn:message:{}", message_type)],
        ENVELOPE_FIELD: payload,
    }))
}
