//! Response unwrapping implementation

use super::types::{ResponseLayout, UnwrapOutcome, UnwrappedPage};
use crate::error::{Error, Result};
use crate::types::{value_to_string, JsonValue};

/// Unwrap a raw response body
///
/// Fails with `MalformedResponse` when the body is not a JSON object. A
/// configured `response` or `results` key that is missing is an upstream
/// error when the configured `error` key is present, and a configuration
/// error otherwise.
pub fn unwrap_response(body: &[u8], layout: &ResponseLayout) -> Result<UnwrapOutcome> {
    let document: JsonValue = serde_json::from_slice(body)
        .map_err(|e| Error::malformed(format!("Response is not valid JSON: {e}")))?;

    if !document.is_object() {
        return Err(Error::malformed(format!(
            "Response is expected to be an object, got {}",
            type_name(&document)
        )));
    }

    let mut envelope = document;

    if let Some(key) = &layout.response {
        match take_key(&mut envelope, key) {
            Some(inner) => envelope = inner,
            None => return missing_key(&envelope, "top-level response", key, layout),
        }
    }

    let results = match &layout.results {
        Some(key) => match take_key(&mut envelope, key) {
            Some(results) => results,
            None => return missing_key(&envelope, "results", key, layout),
        },
        None => envelope.clone(),
    };

    let JsonValue::Array(results) = results else {
        return Err(Error::config(format!(
            "Request results are expected to be an array, got {}",
            type_name(&results)
        )));
    };

    Ok(UnwrapOutcome::Page(UnwrappedPage {
        results,
        count: lookup(&envelope, layout.count.as_deref()).cloned(),
        next: token(&envelope, layout.next.as_deref()),
        prev: token(&envelope, layout.prev.as_deref()),
    }))
}

/// Remove a non-null key from an object
fn take_key(value: &mut JsonValue, key: &str) -> Option<JsonValue> {
    value
        .as_object_mut()
        .and_then(|map| map.remove(key))
        .filter(|v| !v.is_null())
}

fn lookup<'a>(value: &'a JsonValue, key: Option<&str>) -> Option<&'a JsonValue> {
    value.get(key?).filter(|v| !v.is_null())
}

fn token(value: &JsonValue, key: Option<&str>) -> Option<String> {
    lookup(value, key).map(value_to_string)
}

fn missing_key(
    envelope: &JsonValue,
    what: &str,
    key: &str,
    layout: &ResponseLayout,
) -> Result<UnwrapOutcome> {
    if let Some(payload) = lookup(envelope, layout.error.as_deref()) {
        return Ok(UnwrapOutcome::UpstreamError {
            payload: payload.clone(),
            next: token(envelope, layout.next.as_deref()),
        });
    }

    let keys = envelope
        .as_object()
        .map(|map| map.keys().cloned().collect::<Vec<_>>().join(","))
        .unwrap_or_default();

    Err(Error::config(format!(
        "Configured {what} key '{key}' not found in response. Response keys are '{keys}'"
    )))
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
