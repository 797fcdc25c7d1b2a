use std::sync::Arc;

use serde_json::{json, Value};

use crate::dispatcher::{ApiRequest, Dispatcher};
use crate::domain::ApiKey;
use crate::envelope::{decode, Page};
use crate::error::Result;
use crate::validation::{require_id, require_non_empty};

/// `/api-keys` endpoints.
#[derive(Clone)]
pub struct ApiKeys {
    dispatcher: Arc<Dispatcher>,
}

impl ApiKeys {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn list(&self) -> Result<Vec<ApiKey>> {
        let value = self.dispatcher.dispatch(ApiRequest::get("/api-keys")).await?;
        Ok(Page::from_value(value)?.items)
    }

    /// Creates a key. The full secret is only present in this response.
    pub async fn create(&self, name: &str) -> Result<ApiKey> {
        require_non_empty("name", name)?;
        let value = self
            .dispatcher
            .dispatch(ApiRequest::post("/api-keys").with_json(json!({ "name": name.trim() })))
            .await?;
        decode(value)
    }

    /// The API takes the key id as a query parameter, not a path segment.
    pub async fn delete(&self, id: &str) -> Result<Value> {
        require_id("API key", id)?;
        self.dispatcher
            .dispatch(ApiRequest::delete("/api-keys").with_query("id", id.trim()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::{StockAlertError, ValidationError};
    use crate::http_client::{HttpMethod, ScriptedHttpClient};

    fn api_keys(http: Arc<ScriptedHttpClient>) -> ApiKeys {
        let dispatcher = Dispatcher::new(
            ClientConfig::new("sk_test_key").with_base_url("https://api.test/v1"),
            http,
        )
        .expect("valid config");
        ApiKeys::new(Arc::new(dispatcher))
    }

    #[tokio::test]
    async fn delete_sends_id_as_query_parameter() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_json(200, json!({"success": true, "data": null}));

        api_keys(Arc::clone(&http)).delete("key_9").await.expect("deleted");

        let sent = &http.requests()[0];
        assert_eq!(sent.method, HttpMethod::Delete);
        assert_eq!(sent.url, "https://api.test/v1/api-keys");
        assert_eq!(sent.query, vec![(String::from("id"), String::from("key_9"))]);
    }

    #[tokio::test]
    async fn create_returns_the_full_key_once() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_json(
            201,
            json!({"success": true, "data": {
                "id": "key_1",
                "name": "ci",
                "key_prefix": "sk_live_ab",
                "key": "sk_live_abcdef123456"
            }}),
        );

        let key = api_keys(Arc::clone(&http)).create("ci").await.expect("created");
        assert_eq!(key.key.as_deref(), Some("sk_live_abcdef123456"));
        assert_eq!(http.requests()[0].body.as_deref(), Some(r#"{"name":"ci"}"#));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_locally() {
        let http = Arc::new(ScriptedHttpClient::new());

        let err = api_keys(Arc::clone(&http)).create("").await.expect_err("must fail");
        assert_eq!(
            err,
            StockAlertError::Validation(ValidationError::EmptyField { field: "name" })
        );
        assert_eq!(http.request_count(), 0);
    }
}
