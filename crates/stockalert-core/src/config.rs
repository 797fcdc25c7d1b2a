//! Client configuration.
//!
//! A [`ClientConfig`] is built once, validated when a client is constructed,
//! and never mutated afterwards.

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use crate::error::ValidationError;
use crate::http_client::HttpAuth;
use crate::retry::{Backoff, RateLimitRetry, RetryConfig};

pub const DEFAULT_BASE_URL: &str = "https://stockalert.pro/api/public/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;

pub const API_KEY_ENV: &str = "STOCKALERT_API_KEY";
pub const BASE_URL_ENV: &str = "STOCKALERT_BASE_URL";
pub const TIMEOUT_ENV: &str = "STOCKALERT_TIMEOUT_SECS";
pub const MAX_RETRIES_ENV: &str = "STOCKALERT_MAX_RETRIES";

const API_KEY_PREFIX: &str = "sk_";
const MIN_API_KEY_LEN: usize = 10;

/// How the API key is presented to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthScheme {
    /// `X-API-Key: <key>`
    #[default]
    ApiKeyHeader,
    /// `Authorization: Bearer <key>`
    Bearer,
}

impl AuthScheme {
    pub fn build_auth(self, api_key: &str) -> HttpAuth {
        match self {
            Self::ApiKeyHeader => HttpAuth::Header {
                name: String::from("X-API-Key"),
                value: api_key.to_owned(),
            },
            Self::Bearer => HttpAuth::BearerToken(api_key.to_owned()),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub auth_scheme: AuthScheme,
    pub user_agent: String,
    pub backoff: Backoff,
    pub rate_limit_retry: RateLimitRetry,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            auth_scheme: AuthScheme::default(),
            user_agent: default_user_agent(),
            backoff: Backoff::default(),
            rate_limit_retry: RateLimitRetry::default(),
        }
    }

    /// Reads `STOCKALERT_API_KEY` and the optional overrides
    /// `STOCKALERT_BASE_URL`, `STOCKALERT_TIMEOUT_SECS`, `STOCKALERT_MAX_RETRIES`.
    pub fn from_env() -> Result<Self, ValidationError> {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = env_number::<u64>(TIMEOUT_ENV) {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(retries) = env_number::<u32>(MAX_RETRIES_ENV) {
            config = config.with_max_retries(retries);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_auth_scheme(mut self, auth_scheme: AuthScheme) -> Self {
        self.auth_scheme = auth_scheme;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_rate_limit_retry(mut self, rate_limit_retry: RateLimitRetry) -> Self {
        self.rate_limit_retry = rate_limit_retry;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> HttpAuth {
        self.auth_scheme.build_auth(&self.api_key)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            backoff: self.backoff,
            rate_limit: self.rate_limit_retry,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        if !self.api_key.starts_with(API_KEY_PREFIX) || self.api_key.len() < MIN_API_KEY_LEN {
            return Err(ValidationError::InvalidApiKey);
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ValidationError::InvalidBaseUrl {
                value: self.base_url.clone(),
            });
        }
        Ok(())
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("auth_scheme", &self.auth_scheme)
            .field("user_agent", &self.user_agent)
            .field("backoff", &self.backoff)
            .field("rate_limit_retry", &self.rate_limit_retry)
            .finish()
    }
}

fn default_user_agent() -> String {
    format!("stockalert-rust/{}", env!("CARGO_PKG_VERSION"))
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}
