//! Endpoint facades. Each one is a thin, cloneable handle over the shared
//! [`Dispatcher`](crate::dispatcher::Dispatcher).

mod alerts;
mod api_keys;
mod webhooks;

pub use alerts::Alerts;
pub use api_keys::ApiKeys;
pub use webhooks::Webhooks;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ValidationError};

pub(crate) fn encode_body<T: Serialize>(body: &T) -> Result<Value> {
    serde_json::to_value(body).map_err(|error| {
        ValidationError::UnencodableBody {
            message: error.to_string(),
        }
        .into()
    })
}

/// Percent-encodes an identifier for use as a path segment.
pub(crate) fn path_segment(id: &str) -> String {
    urlencoding::encode(id.trim()).into_owned()
}
