//! Serde types and helpers for the platform's wire format.
//!
//! Most responses are wrapped as `{ status, message, data }`. Some endpoints
//! return the bare payload, so unwrapping falls back to the whole body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;
use crate::domain::Role;

#[derive(Debug, Serialize)]
pub struct ApiLoginRequest<'a> {
  pub email: &'a str,
  pub password: &'a str,
}

/// `data` of a successful login or registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAuthData {
  pub token: String,
  #[serde(alias = "id")]
  pub user_id: i64,
  pub role: Role,
  #[serde(default)]
  pub email: String,
}

/// Parse a body and strip the response envelope if there is one.
///
/// An empty body is `null`.
pub(crate) fn unwrap_envelope(body: &[u8]) -> Result<Value, ApiError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(Value::Null);
  }

  let value: Value =
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(format!("invalid JSON: {}", e)))?;

  match value {
    Value::Object(mut map) if is_envelope(&map) => Ok(map.remove("data").unwrap_or(Value::Null)),
    other => Ok(other),
  }
}

fn is_envelope(map: &serde_json::Map<String, Value>) -> bool {
  map.contains_key("data") && (map.contains_key("status") || map.contains_key("message"))
}

/// Human-readable message from an error body, if the server sent one.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
  let value: Value = serde_json::from_slice(body).ok()?;
  ["message", "error", "detail"]
    .iter()
    .find_map(|k| value.get(k).and_then(Value::as_str))
    .filter(|m| !m.trim().is_empty())
    .map(String::from)
}
