use std::sync::Arc;

use serde_json::Value;

use crate::dispatcher::{ApiRequest, Dispatcher};
use crate::domain::{CreateWebhookRequest, Webhook};
use crate::envelope::{decode, Page};
use crate::error::{Result, ValidationError};
use crate::resources::{encode_body, path_segment};
use crate::validation::{require_id, require_non_empty};

/// `/webhooks` endpoints.
#[derive(Clone)]
pub struct Webhooks {
    dispatcher: Arc<Dispatcher>,
}

impl Webhooks {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn list(&self) -> Result<Vec<Webhook>> {
        let value = self.dispatcher.dispatch(ApiRequest::get("/webhooks")).await?;
        Ok(Page::from_value(value)?.items)
    }

    /// `POST /webhooks`. The signing secret is only returned here.
    pub async fn create(&self, request: CreateWebhookRequest) -> Result<Webhook> {
        require_non_empty("url", &request.url)?;
        if request.events.is_empty() {
            return Err(ValidationError::EmptyField { field: "events" }.into());
        }

        let body = encode_body(&request)?;
        let value = self
            .dispatcher
            .dispatch(ApiRequest::post("/webhooks").with_json(body))
            .await?;
        decode(value)
    }

    pub async fn delete(&self, id: &str) -> Result<Value> {
        require_id("Webhook", id)?;
        self.dispatcher
            .dispatch(ApiRequest::delete(format!("/webhooks/{}", path_segment(id))))
            .await
    }

    /// Asks the API to deliver a sample event to the subscriber.
    pub async fn test(&self, id: &str) -> Result<Value> {
        require_id("Webhook", id)?;
        self.dispatcher
            .dispatch(ApiRequest::post(format!(
                "/webhooks/{}/test",
                path_segment(id)
            )))
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::StockAlertError;
    use crate::http_client::{HttpMethod, ScriptedHttpClient};

    fn webhooks(http: Arc<ScriptedHttpClient>) -> Webhooks {
        let dispatcher = Dispatcher::new(
            ClientConfig::new("sk_test_key").with_base_url("https://api.test/v1"),
            http,
        )
        .expect("valid config");
        Webhooks::new(Arc::new(dispatcher))
    }

    #[tokio::test]
    async fn create_subscribes_to_alert_triggered_by_default() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_json(
            201,
            json!({"success": true, "data": {
                "id": "wh_1",
                "url": "https://example.com/hook",
                "events": ["alert.triggered"],
                "secret": "whsec_abc",
                "is_active": true
            }}),
        );

        let webhook = webhooks(Arc::clone(&http))
            .create(CreateWebhookRequest::new("https://example.com/hook"))
            .await
            .expect("created");
        assert_eq!(webhook.secret.as_deref(), Some("whsec_abc"));

        let sent = &http.requests()[0];
        assert_eq!(sent.url, "https://api.test/v1/webhooks");
        assert_eq!(
            sent.body.as_deref(),
            Some(r#"{"events":["alert.triggered"],"url":"https://example.com/hook"}"#)
        );
    }

    #[tokio::test]
    async fn create_rejects_blank_url_and_empty_events_locally() {
        let http = Arc::new(ScriptedHttpClient::new());
        let webhooks = webhooks(Arc::clone(&http));

        let err = webhooks
            .create(CreateWebhookRequest::new(" "))
            .await
            .expect_err("blank url");
        assert_eq!(
            err,
            StockAlertError::Validation(ValidationError::EmptyField { field: "url" })
        );

        let err = webhooks
            .create(CreateWebhookRequest::new("https://example.com").events(Vec::<String>::new()))
            .await
            .expect_err("no events");
        assert_eq!(
            err,
            StockAlertError::Validation(ValidationError::EmptyField { field: "events" })
        );
        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn list_accepts_plain_data_array() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_json(
            200,
            json!({"success": true, "data": [
                {"id": "wh_1", "url": "https://a.example"},
                {"id": "wh_2", "url": "https://b.example", "is_active": false, "failure_count": 3}
            ]}),
        );

        let hooks = webhooks(http).list().await.expect("listed");
        assert_eq!(hooks.len(), 2);
        assert!(hooks[0].is_active);
        assert!(!hooks[1].is_active);
        assert_eq!(hooks[1].failure_count, 3);
    }

    #[tokio::test]
    async fn test_posts_to_the_test_endpoint() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_json(200, json!({"success": true, "data": {"delivered": true}}));

        let value = webhooks(Arc::clone(&http)).test("wh_1").await.expect("sent");
        assert_eq!(value, json!({"delivered": true}));

        let sent = &http.requests()[0];
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, "https://api.test/v1/webhooks/wh_1/test");
    }
}
