//! Response envelope handling.
//!
//! Success bodies look like `{"success": true, "data": ...}`; list bodies add
//! either a `meta` block (`total`, `limit`, `offset`, `has_more`) or a
//! `pagination` block (`page`, `limit`, `total`, `totalPages`). Error bodies
//! look like `{"success": false, "error": "...", "errors": [...]}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StockAlertError};

/// Strips the envelope from a single-object response. List responses keep
/// their envelope so pagination metadata survives.
pub fn unwrap_data(envelope: Value) -> Value {
    match envelope {
        Value::Object(mut map)
            if map.contains_key("data")
                && !map.contains_key("meta")
                && !map.contains_key("pagination") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// `true` when the body carries an explicit `"success": false`.
pub fn is_failure_envelope(body: &Value) -> bool {
    matches!(body.get("success"), Some(Value::Bool(false)))
}

/// Message from the `error` field, which is either a string or an object
/// with a `message` field.
pub fn error_message(body: &Value) -> Option<String> {
    let from_error = match body.get("error") {
        Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
        Some(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    };

    from_error.or_else(|| {
        body.get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
    })
}

/// Field-level validation errors from the `errors` list.
pub fn field_errors(body: &Value) -> Vec<String> {
    let Some(Value::Array(entries)) = body.get("errors") else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(message) => Some(message.clone()),
            Value::Object(map) => {
                let message = map.get("message").and_then(Value::as_str)?;
                match map.get("field").and_then(Value::as_str) {
                    Some(field) => Some(format!("{field}: {message}")),
                    None => Some(message.to_owned()),
                }
            }
            _ => None,
        })
        .collect()
}

/// Decodes an already-unwrapped payload into a typed value.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|error| {
        StockAlertError::api(200, format!("unexpected response shape: {error}"), None)
    })
}

/// Offset-style pagination block (`meta`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetMeta {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

/// Page-number pagination block (`pagination`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedMeta {
    pub page: u64,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMeta {
    Offset(OffsetMeta),
    Numbered(NumberedMeta),
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: Option<PageMeta>,
}

impl<T: DeserializeOwned> Page<T> {
    /// Accepts a full list envelope or a bare array.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(_) => Ok(Self {
                items: decode(value)?,
                meta: None,
            }),
            Value::Object(mut map) => {
                let items = match map.remove("data") {
                    Some(data @ Value::Array(_)) => decode(data)?,
                    Some(Value::Null) | None => Vec::new(),
                    Some(_) => {
                        return Err(StockAlertError::api(
                            200,
                            "unexpected response shape: list data is not an array",
                            None,
                        ))
                    }
                };
                let meta = if let Some(meta) = map.remove("meta") {
                    Some(PageMeta::Offset(decode(meta)?))
                } else if let Some(pagination) = map.remove("pagination") {
                    Some(PageMeta::Numbered(decode(pagination)?))
                } else {
                    None
                };
                Ok(Self { items, meta })
            }
            _ => Err(StockAlertError::api(
                200,
                "unexpected response shape: expected a list envelope",
                None,
            )),
        }
    }
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Option<u64> {
        match &self.meta {
            Some(PageMeta::Offset(meta)) => meta.total,
            Some(PageMeta::Numbered(meta)) => meta.total,
            None => None,
        }
    }

    /// Whether no further page should be requested after this one.
    pub fn is_last(&self, requested_limit: usize) -> bool {
        if self.items.is_empty() || self.items.len() < requested_limit {
            return true;
        }
        match &self.meta {
            Some(PageMeta::Offset(meta)) => meta.has_more == Some(false),
            Some(PageMeta::Numbered(meta)) => meta.page >= meta.total_pages,
            None => false,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
