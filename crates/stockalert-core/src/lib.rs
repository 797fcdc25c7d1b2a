//! # StockAlert Core
//!
//! Typed client for the StockAlert.pro alerting API.
//!
//! ## Overview
//!
//! - **Request dispatcher** with authentication, retries and typed error mapping
//! - **Pre-flight validation** for alert creation
//! - **Lazy pagination** over alerts
//! - **Resource facades** for alerts, webhooks and API keys
//! - **Webhook signatures** (HMAC-SHA256)
//! - **Blocking and async entry points** over one core
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`blocking`] | Synchronous client on a private runtime |
//! | [`client`] | Async client |
//! | [`config`] | Client configuration and environment loading |
//! | [`dispatcher`] | Request dispatch and retry loop |
//! | [`domain`] | Alert, Webhook, ApiKey and friends |
//! | [`envelope`] | Response envelope and page decoding |
//! | [`error`] | Error taxonomy |
//! | [`http_client`] | Transport abstraction |
//! | [`observer`] | Request lifecycle hooks |
//! | [`pagination`] | Alert pager |
//! | [`rate_limit`] | Per-URL cool-down tracking |
//! | [`resources`] | Endpoint facades |
//! | [`retry`] | Backoff and retry decisions |
//! | [`signature`] | Webhook signature helpers |
//! | [`validation`] | Alert validation rules |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stockalert_core::{AlertCondition, BlockingClient, ClientConfig, CreateAlertRequest};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BlockingClient::new(ClientConfig::new("sk_your_api_key"))?;
//!
//!     let alert = client.alerts().create(
//!         CreateAlertRequest::new("AAPL", AlertCondition::PriceAbove).threshold(200.0),
//!     )?;
//!     println!("created {} ({})", alert.id, alert.status);
//!
//!     for alert in client.alerts().iterate(Default::default()) {
//!         println!("{}", alert?.symbol);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   ┌──────────────────┐
//! │ BlockingClient │──▶│ StockAlertClient │
//! └────────────────┘   └────────┬─────────┘
//!                               │
//!                               ▼
//!                  ┌─────────────────────────┐
//!                  │ Alerts / Webhooks / Keys│
//!                  └────────────┬────────────┘
//!                               ▼
//! ┌──────────────┐   ┌─────────────────────┐   ┌──────────────┐
//! │ RetryConfig  │◀──│     Dispatcher      │──▶│ HttpClient   │
//! │ RateLimits   │   │ (envelope, errors)  │   │ (reqwest)    │
//! └──────────────┘   └─────────────────────┘   └──────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`Result`] with a [`StockAlertError`]:
//!
//! ```rust
//! use stockalert_core::{ErrorKind, StockAlertError};
//!
//! fn handle_error(error: &StockAlertError) {
//!     match error.kind() {
//!         ErrorKind::RateLimit => {
//!             // error.retry_after() says how long the cool-down lasts
//!         }
//!         ErrorKind::Validation => {
//!             // Nothing was sent
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are redacted from `Debug` output and never logged
//! - Webhook signatures are compared in constant time

pub mod blocking;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod observer;
pub mod pagination;
pub mod rate_limit;
pub mod resources;
pub mod retry;
pub mod signature;
pub mod validation;

pub use blocking::{BlockingAlertIter, BlockingClient};
pub use client::StockAlertClient;
pub use config::{AuthScheme, ClientConfig};
pub use dispatcher::ApiRequest;
pub use domain::{
    Alert, AlertCondition, AlertStatus, ApiKey, CreateAlertRequest, CreateWebhookRequest,
    ListAlertsParams, NotificationChannel, Symbol, Timestamp, Webhook, WebhookPayload,
    ALERT_TRIGGERED,
};
pub use envelope::Page;
pub use error::{ErrorKind, NetworkErrorKind, Result, StockAlertError, ValidationError};
pub use http_client::{HttpClient, ReqwestHttpClient, ScriptedHttpClient};
pub use observer::{NoopObserver, RequestObserver, TracingObserver};
pub use pagination::AlertPager;
pub use retry::{Backoff, RateLimitRetry};
pub use signature::{sign_payload, verify_signature, SIGNATURE_HEADER};
