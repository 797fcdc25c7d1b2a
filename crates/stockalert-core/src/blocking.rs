//! Synchronous facade.
//!
//! [`BlockingClient`] drives the async client on a private current-thread
//! tokio runtime, so retries, backoff, validation order and error mapping are
//! exactly those of [`StockAlertClient`]. Calling it from inside another
//! tokio runtime panics; use the async client there.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::client::StockAlertClient;
use crate::config::ClientConfig;
use crate::dispatcher::ApiRequest;
use crate::domain::{
    Alert, AlertStatus, ApiKey, CreateAlertRequest, CreateWebhookRequest, ListAlertsParams,
    Webhook,
};
use crate::envelope::Page;
use crate::error::{NetworkErrorKind, Result, StockAlertError};
use crate::http_client::HttpClient;
use crate::observer::RequestObserver;
use crate::pagination::AlertPager;
use crate::resources::{Alerts, ApiKeys, Webhooks};

pub struct BlockingClient {
    inner: StockAlertClient,
    runtime: Arc<Runtime>,
}

impl BlockingClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::from_async(StockAlertClient::new(config)?)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_async(StockAlertClient::from_env()?)
    }

    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        Self::from_async(StockAlertClient::with_http_client(config, http)?)
    }

    pub fn with_observer(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
        observer: Arc<dyn RequestObserver>,
    ) -> Result<Self> {
        Self::from_async(StockAlertClient::with_observer(config, http, observer)?)
    }

    /// Wraps an existing async client; both share cool-down state.
    pub fn from_async(inner: StockAlertClient) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                StockAlertError::network(
                    NetworkErrorKind::Other,
                    format!("failed to start runtime: {error}"),
                )
            })?;

        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    pub fn as_async(&self) -> &StockAlertClient {
        &self.inner
    }

    pub fn alerts(&self) -> BlockingAlerts<'_> {
        BlockingAlerts {
            alerts: self.inner.alerts(),
            runtime: &self.runtime,
        }
    }

    pub fn webhooks(&self) -> BlockingWebhooks<'_> {
        BlockingWebhooks {
            webhooks: self.inner.webhooks(),
            runtime: &self.runtime,
        }
    }

    pub fn api_keys(&self) -> BlockingApiKeys<'_> {
        BlockingApiKeys {
            api_keys: self.inner.api_keys(),
            runtime: &self.runtime,
        }
    }

    pub fn request(&self, request: ApiRequest) -> Result<Value> {
        self.runtime.block_on(self.inner.request(request))
    }
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

pub struct BlockingAlerts<'a> {
    alerts: &'a Alerts,
    runtime: &'a Arc<Runtime>,
}

impl BlockingAlerts<'_> {
    pub fn list(&self, params: &ListAlertsParams) -> Result<Page<Alert>> {
        self.runtime.block_on(self.alerts.list(params))
    }

    pub fn create(&self, request: CreateAlertRequest) -> Result<Alert> {
        self.runtime.block_on(self.alerts.create(request))
    }

    pub fn get(&self, id: &str) -> Result<Alert> {
        self.runtime.block_on(self.alerts.get(id))
    }

    pub fn update(&self, id: &str, status: AlertStatus) -> Result<Alert> {
        self.runtime.block_on(self.alerts.update(id, status))
    }

    pub fn delete(&self, id: &str) -> Result<Value> {
        self.runtime.block_on(self.alerts.delete(id))
    }

    /// Blocking iterator over every matching alert, fetched page by page.
    pub fn iterate(&self, params: ListAlertsParams) -> BlockingAlertIter {
        BlockingAlertIter {
            pager: self.alerts.iterate(params),
            runtime: Arc::clone(self.runtime),
        }
    }
}

pub struct BlockingWebhooks<'a> {
    webhooks: &'a Webhooks,
    runtime: &'a Arc<Runtime>,
}

impl BlockingWebhooks<'_> {
    pub fn list(&self) -> Result<Vec<Webhook>> {
        self.runtime.block_on(self.webhooks.list())
    }

    pub fn create(&self, request: CreateWebhookRequest) -> Result<Webhook> {
        self.runtime.block_on(self.webhooks.create(request))
    }

    pub fn delete(&self, id: &str) -> Result<Value> {
        self.runtime.block_on(self.webhooks.delete(id))
    }

    pub fn test(&self, id: &str) -> Result<Value> {
        self.runtime.block_on(self.webhooks.test(id))
    }
}

pub struct BlockingApiKeys<'a> {
    api_keys: &'a ApiKeys,
    runtime: &'a Arc<Runtime>,
}

impl BlockingApiKeys<'_> {
    pub fn list(&self) -> Result<Vec<ApiKey>> {
        self.runtime.block_on(self.api_keys.list())
    }

    pub fn create(&self, name: &str) -> Result<ApiKey> {
        self.runtime.block_on(self.api_keys.create(name))
    }

    pub fn delete(&self, id: &str) -> Result<Value> {
        self.runtime.block_on(self.api_keys.delete(id))
    }
}

/// Yields `Err` at most once, then ends.
pub struct BlockingAlertIter {
    pager: AlertPager,
    runtime: Arc<Runtime>,
}

impl Iterator for BlockingAlertIter {
    type Item = Result<Alert>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.pager.next())
    }
}
