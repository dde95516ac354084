//! Response envelope decoding
//!
//! The service wraps payloads as `{ "success": true, "data": ... }` and
//! failures as `{ "success": false, "error": ... }`, where `error` is either
//! a string or an object carrying a `message`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use studyarc_domain::{Result, StudyArcError};

const APPLICATION_FALLBACK_MESSAGE: &str = "Request failed";

/// Decode the body of a 2xx response into `T`.
///
/// An empty body, or an envelope without `data`, decodes as JSON `null`.
/// A body that is not an envelope at all is decoded as the payload itself.
pub(crate) fn decode_success<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return from_payload(Value::Null);
    }

    let value: Value = serde_json::from_slice(body).map_err(|err| {
        StudyArcError::Application(format!("Response is not valid JSON: {err}"))
    })?;

    let Value::Object(mut object) = value else {
        return from_payload(value);
    };

    match object.get("success").and_then(Value::as_bool) {
        Some(true) => from_payload(object.remove("data").unwrap_or(Value::Null)),
        Some(false) => Err(StudyArcError::Application(
            message_from_object(&object)
                .unwrap_or_else(|| APPLICATION_FALLBACK_MESSAGE.to_string()),
        )),
        None => from_payload(Value::Object(object)),
    }
}

/// Best-effort message for a non-2xx body: the envelope's error message if
/// it parses, else the raw text. `None` for a blank body.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    if let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) {
        if let Some(message) = message_from_object(&object) {
            return Some(message);
        }
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

fn message_from_object(object: &serde_json::Map<String, Value>) -> Option<String> {
    let from_error = match object.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(Value::Object(inner)) => {
            inner.get("message").and_then(Value::as_str).map(str::to_string)
        }
        _ => None,
    };
    from_error
        .or_else(|| object.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|message| !message.trim().is_empty())
}

fn from_payload<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|err| {
        StudyArcError::Application(format!("Unexpected response format: {err}"))
    })
}
