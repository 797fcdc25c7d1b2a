use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Timestamp;

/// Event sent when an alert condition is met.
pub const ALERT_TRIGGERED: &str = "alert.triggered";

/// Subscription registered with `POST /webhooks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub events: Vec<String>,
    /// Only present in the create response.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub last_triggered_at: Option<Timestamp>,
    #[serde(default)]
    pub failure_count: u32,
}

fn default_active() -> bool {
    true
}

/// Body of `POST /webhooks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateWebhookRequest {
    pub url: String,
    pub events: Vec<String>,
}

impl CreateWebhookRequest {
    /// Subscribes to `alert.triggered` unless other events are added.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            events: vec![String::from(ALERT_TRIGGERED)],
        }
    }

    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }
}

/// Payload the API POSTs to a subscriber endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub event: String,
    pub timestamp: Timestamp,
    pub data: Map<String, Value>,
}

impl WebhookPayload {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn is_alert_triggered(&self) -> bool {
        self.event == ALERT_TRIGGERED
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn webhook_tolerates_sparse_payloads() {
        let webhook: Webhook = serde_json::from_value(json!({
            "id": "wh_1",
            "url": "https://example.test/hook"
        }))
        .expect("decodes");

        assert!(webhook.is_active);
        assert!(webhook.events.is_empty());
        assert_eq!(webhook.failure_count, 0);
        assert_eq!(webhook.secret, None);
    }

    #[test]
    fn create_request_defaults_to_alert_triggered() {
        let request = CreateWebhookRequest::new("https://example.test/hook");
        assert_eq!(request.events, vec![String::from("alert.triggered")]);

        let request = request.events(["alert.triggered", "alert.created"]);
        assert_eq!(request.events.len(), 2);
    }

    #[test]
    fn parses_incoming_payload() {
        let body = br#"{
            "event": "alert.triggered",
            "timestamp": "2024-01-01T00:00:00Z",
            "data": {"alert_id": "test-123", "symbol": "AAPL", "current_value": 155.0}
        }"#;

        let payload = WebhookPayload::from_slice(body).expect("decodes");
        assert!(payload.is_alert_triggered());
        assert_eq!(payload.data["alert_id"], json!("test-123"));
    }
}
