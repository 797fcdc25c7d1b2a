//! # Domain Models
//!
//! Typed request and response objects for the StockAlert API.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Alert`] | Alert as returned by the API |
//! | [`AlertCondition`] | The 21 triggering rules (plus `Unknown`) |
//! | [`CreateAlertRequest`] | Raw input for `POST /alerts` |
//! | [`ListAlertsParams`] | Filters for `GET /alerts` |
//! | [`Webhook`] | Webhook subscription |
//! | [`WebhookPayload`] | Body delivered to webhook subscribers |
//! | [`ApiKey`] | API key metadata |
//! | [`Symbol`] | Validated 1-5 letter ticker |
//! | [`Timestamp`] | RFC3339 timestamp in UTC |
//!
//! Response types are rebuilt from every response body; nothing is cached.

mod alert;
mod api_key;
mod symbol;
mod timestamp;
mod webhook;

pub use alert::{
    Alert, AlertCondition, AlertParameters, AlertStatus, CreateAlertRequest, ListAlertsParams,
    NotificationChannel, ThresholdRule,
};
pub use api_key::ApiKey;
pub use symbol::Symbol;
pub use timestamp::Timestamp;
pub use webhook::{CreateWebhookRequest, Webhook, WebhookPayload, ALERT_TRIGGERED};
