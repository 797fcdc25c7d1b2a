//! Request lifecycle hooks.
//!
//! The dispatcher reports every attempt to a [`RequestObserver`] supplied at
//! construction. The default observer does nothing; [`TracingObserver`]
//! forwards events to `tracing`. Observers never see credentials.

use std::time::Duration;

use crate::error::StockAlertError;
use crate::http_client::HttpMethod;

/// Attempt metadata shared with observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestInfo<'a> {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: &'a str,
    /// 0-based attempt index within one logical call.
    pub attempt: u32,
}

pub trait RequestObserver: Send + Sync {
    fn on_request(&self, _info: &RequestInfo<'_>) {}

    fn on_response(&self, _info: &RequestInfo<'_>, _status: u16, _elapsed: Duration) {}

    fn on_retry(&self, _info: &RequestInfo<'_>, _error: &StockAlertError, _delay: Duration) {}

    fn on_error(&self, _info: &RequestInfo<'_>, _error: &StockAlertError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {}

/// Emits one structured `tracing` event per hook under the `stockalert` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, info: &RequestInfo<'_>) {
        tracing::debug!(
            target: "stockalert",
            method = %info.method,
            url = info.url,
            attempt = info.attempt,
            "sending request"
        );
    }

    fn on_response(&self, info: &RequestInfo<'_>, status: u16, elapsed: Duration) {
        tracing::debug!(
            target: "stockalert",
            method = %info.method,
            url = info.url,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "received response"
        );
    }

    fn on_retry(&self, info: &RequestInfo<'_>, error: &StockAlertError, delay: Duration) {
        tracing::warn!(
            target: "stockalert",
            method = %info.method,
            url = info.url,
            attempt = info.attempt,
            kind = %error.kind(),
            delay_ms = delay.as_millis() as u64,
            "retrying after error: {error}"
        );
    }

    fn on_error(&self, info: &RequestInfo<'_>, error: &StockAlertError) {
        tracing::warn!(
            target: "stockalert",
            method = %info.method,
            url = info.url,
            kind = %error.kind(),
            "request failed: {error}"
        );
    }
}
