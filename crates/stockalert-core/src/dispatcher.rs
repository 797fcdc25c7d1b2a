//! Request dispatch: URL resolution, headers, status mapping, envelope
//! unwrapping and the retry loop around them.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::envelope::{error_message, field_errors, is_failure_envelope, unwrap_data};
use crate::error::{Result, StockAlertError, ValidationError};
use crate::http_client::{HttpAuth, HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::observer::{NoopObserver, RequestInfo, RequestObserver};
use crate::rate_limit::{parse_retry_after, round_up_to_secs, RateLimitState};
use crate::retry::{RetryConfig, RetryDecision};

const MAX_LOGGED_BODY: usize = 200;

/// One logical API call before it is resolved against the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    /// Parameters with a `None` value are not sent.
    pub query: Vec<(String, Option<String>)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), Some(value.to_string())));
        self
    }

    pub fn with_optional_query<V: ToString>(
        mut self,
        name: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        self.query
            .push((name.into(), value.map(|value| value.to_string())));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends [`ApiRequest`]s and turns responses into JSON values or typed errors.
pub struct Dispatcher {
    config: ClientConfig,
    auth: HttpAuth,
    retry: RetryConfig,
    http: Arc<dyn HttpClient>,
    observer: Arc<dyn RequestObserver>,
    rate_limits: RateLimitState,
}

impl Dispatcher {
    /// Validates `config` and builds a dispatcher with a no-op observer.
    pub fn new(config: ClientConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        Self::with_observer(config, http, Arc::new(NoopObserver))
    }

    pub fn with_observer(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
        observer: Arc<dyn RequestObserver>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            auth: config.auth(),
            retry: config.retry_config(),
            config,
            http,
            observer,
            rate_limits: RateLimitState::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn rate_limits(&self) -> &RateLimitState {
        &self.rate_limits
    }

    /// Absolute URL for `path`, which may or may not start with `/`.
    pub fn resolve_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url(),
            path.trim_start_matches('/')
        )
    }

    /// Runs `request` under the retry policy and returns the unwrapped payload.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<Value> {
        let url = self.resolve_url(&request.path);
        let http_request = self.build_http_request(&request, &url);
        let mut rate_limit_retried = false;
        let mut attempt = 0_u32;

        tracing::debug!(method = %request.method, url = %url, "dispatching request");

        loop {
            let info = RequestInfo {
                method: request.method,
                url: &url,
                attempt,
            };

            if let Some(wait) = self.rate_limits.remaining(&url) {
                let wait = round_up_to_secs(wait);
                let error = StockAlertError::rate_limited(
                    format!(
                        "Rate limit in effect. Please wait {} seconds.",
                        wait.as_secs()
                    ),
                    wait,
                );
                tracing::warn!(url = %url, wait_secs = wait.as_secs(), "cool-down active, request not sent");
                self.observer.on_error(&info, &error);
                return Err(error);
            }

            let error = match self.send_once(http_request.clone(), &info).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            match self.retry.decide(&error, attempt, rate_limit_retried) {
                RetryDecision::RetryAfter(delay) => {
                    if matches!(error, StockAlertError::RateLimit { .. }) {
                        rate_limit_retried = true;
                    }
                    self.observer.on_retry(&info, &error, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp => {
                    self.observer.on_error(&info, &error);
                    return Err(error);
                }
            }
        }
    }

    fn build_http_request(&self, request: &ApiRequest, url: &str) -> HttpRequest {
        let mut http_request = HttpRequest::new(request.method, url)
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/json")
            .with_header("User-Agent", self.config.user_agent.as_str())
            .with_auth(&self.auth)
            .with_timeout(self.config.timeout);

        for (name, value) in &request.query {
            if let Some(value) = value {
                http_request = http_request.with_query(name.as_str(), value.as_str());
            }
        }

        if let Some(body) = &request.body {
            http_request = http_request.with_body(body.to_string());
        }

        http_request
    }

    async fn send_once(&self, request: HttpRequest, info: &RequestInfo<'_>) -> Result<Value> {
        self.observer.on_request(info);
        let started = Instant::now();

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|error| StockAlertError::network(error.kind(), error.message()))?;

        self.observer
            .on_response(info, response.status, started.elapsed());
        self.interpret(info.url, response)
    }

    fn interpret(&self, url: &str, response: HttpResponse) -> Result<Value> {
        let status = response.status;
        let parsed = parse_body(&response.body);

        if status == 429 {
            let retry_after = parse_retry_after(response.header("retry-after"));
            self.rate_limits.record(url, retry_after);
            let message = parsed
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| String::from("Rate limit exceeded"));
            return Err(StockAlertError::rate_limited(message, retry_after));
        }

        if status == 401 {
            return Err(StockAlertError::Authentication {
                message: parsed
                    .as_ref()
                    .and_then(error_message)
                    .unwrap_or_else(|| String::from("Authentication failed")),
            });
        }

        if status == 404 {
            return Err(StockAlertError::NotFound {
                message: parsed
                    .as_ref()
                    .and_then(error_message)
                    .unwrap_or_else(|| String::from("Resource not found")),
            });
        }

        if status == 400 || status == 422 {
            if let Some(body) = &parsed {
                let errors = field_errors(body);
                if !errors.is_empty() {
                    let base =
                        error_message(body).unwrap_or_else(|| String::from("Validation failed"));
                    return Err(ValidationError::Rejected {
                        message: format!("{base}: {}", errors.join(", ")),
                        errors,
                    }
                    .into());
                }
            }
        }

        if !response.is_success() {
            let message = parsed
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| format!("HTTP {status} error"));
            let body = parsed.or_else(|| {
                (!response.body.is_empty()).then(|| Value::String(response.body.clone()))
            });
            return Err(StockAlertError::api(status, message, body));
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        let Some(value) = parsed else {
            return Err(StockAlertError::api(
                status,
                format!(
                    "Invalid JSON response: {}",
                    truncate(&response.body, MAX_LOGGED_BODY)
                ),
                Some(Value::String(response.body)),
            ));
        };

        if is_failure_envelope(&value) {
            let message =
                error_message(&value).unwrap_or_else(|| String::from("Request failed"));
            return Err(StockAlertError::api(status, message, Some(value)));
        }

        Ok(unwrap_data(value))
    }
}

fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    serde_json::from_str(body).ok()
}

fn truncate(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}
