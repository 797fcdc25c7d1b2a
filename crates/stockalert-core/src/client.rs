use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::dispatcher::{ApiRequest, Dispatcher};
use crate::error::Result;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::observer::{NoopObserver, RequestObserver};
use crate::resources::{Alerts, ApiKeys, Webhooks};

/// Async entry point. Resource handles share one dispatcher, so rate-limit
/// cool-downs recorded by one call apply to the next.
#[derive(Clone)]
pub struct StockAlertClient {
    dispatcher: Arc<Dispatcher>,
    alerts: Alerts,
    webhooks: Webhooks,
    api_keys: ApiKeys,
}

impl StockAlertClient {
    /// Client over the default `reqwest` transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    /// Reads `STOCKALERT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        Self::with_observer(config, http, Arc::new(NoopObserver))
    }

    pub fn with_observer(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
        observer: Arc<dyn RequestObserver>,
    ) -> Result<Self> {
        let dispatcher = Arc::new(Dispatcher::with_observer(config, http, observer)?);
        Ok(Self {
            alerts: Alerts::new(Arc::clone(&dispatcher)),
            webhooks: Webhooks::new(Arc::clone(&dispatcher)),
            api_keys: ApiKeys::new(Arc::clone(&dispatcher)),
            dispatcher,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.dispatcher.config()
    }

    pub fn alerts(&self) -> &Alerts {
        &self.alerts
    }

    pub fn webhooks(&self) -> &Webhooks {
        &self.webhooks
    }

    pub fn api_keys(&self) -> &ApiKeys {
        &self.api_keys
    }

    /// Sends an arbitrary request through the same retry and error mapping
    /// as the typed endpoints.
    pub async fn request(&self, request: ApiRequest) -> Result<Value> {
        self.dispatcher.dispatch(request).await
    }
}

impl std::fmt::Debug for StockAlertClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockAlertClient")
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}
