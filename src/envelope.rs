// Response envelope normalisation.
//
// The services wrap payloads as `{ "data": ... }`, some endpoints double wrap as
// `{ "data": { "data": ... } }` and a few return the bare payload. Everything
// coming off the wire goes through `decode` so callers only ever see entities.
use crate::api_client::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;

const ENVELOPE_KEY: &str = "data";
const MAX_ENVELOPE_DEPTH: usize = 2;

// Peel up to two `data` layers off a response body
pub fn unwrap_envelope(mut value: Value) -> Value {
    for _ in 0..MAX_ENVELOPE_DEPTH {
        match value {
            Value::Object(mut map) if map.contains_key(ENVELOPE_KEY) => {
                value = map.remove(ENVELOPE_KEY).unwrap_or(Value::Null);
            }
            other => return other,
        }
    }
    value
}

pub fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    let payload = unwrap_envelope(body);
    if payload.is_null() {
        return Err(ApiError::EmptyPayload);
    }
    serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}

pub fn decode_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::EmptyPayload);
    }
    let body: Value =
        serde_json::from_slice(bytes).map_err(|e| ApiError::Decode(e.to_string()))?;
    decode(body)
}
