//! Shared HTTP lookup used by every provider.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::{GeoError, Result};

/// Longest provider error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Build the HTTP client shared by all locators.
///
/// `timeout` bounds each lookup end to end. It should not exceed the
/// request budget of the caller, otherwise a slow provider consumes the
/// time left for the storage write.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Issue one GET and decode a 2xx JSON object body.
pub(crate) async fn fetch_json(http: &reqwest::Client, url: &str) -> Result<Map<String, Value>> {
    let response = http.get(url).send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let body: String = String::from_utf8_lossy(&body)
            .chars()
            .take(MAX_ERROR_BODY)
            .collect();
        return Err(GeoError::Status {
            status: status.as_u16(),
            body,
        });
    }

    match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(other) => Err(GeoError::MalformedBody(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(GeoError::MalformedBody(e.to_string())),
    }
}

/// Read a field as text. Numbers are accepted (some providers send zip
/// codes as integers); anything else is treated as missing.
pub(crate) fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a field as a float. Numeric strings are accepted.
pub(crate) fn float_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
