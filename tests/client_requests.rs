//! Behavior-driven tests for request dispatch
//!
//! These tests verify HOW the client talks to the API: which headers it sends,
//! how often it retries, how long it waits and how it honours rate limits.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use stockalert_core::http_client::{HttpError, HttpResponse};
use stockalert_core::observer::RequestInfo;
use stockalert_core::{
    AlertStatus, ApiRequest, AuthScheme, ClientConfig, ErrorKind, ListAlertsParams,
    RateLimitRetry, RequestObserver, ScriptedHttpClient, StockAlertClient, StockAlertError,
    TracingObserver,
};
use stockalert_tests::{test_config, TEST_API_KEY};
use tokio::time::Instant;

fn config() -> ClientConfig {
    test_config()
}

fn client_with(http: &Arc<ScriptedHttpClient>, config: ClientConfig) -> StockAlertClient {
    StockAlertClient::with_http_client(config, Arc::clone(http) as _).expect("valid config")
}

fn alert_json(id: &str) -> Value {
    json!({
        "id": id,
        "symbol": "AAPL",
        "condition": "price_above",
        "threshold": 150.0,
        "notification": "email",
        "status": "active",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

fn rate_limited(retry_after: Option<&str>) -> HttpResponse {
    let response = HttpResponse::new(
        429,
        json!({"success": false, "error": "Rate limit exceeded"}).to_string(),
    );
    match retry_after {
        Some(value) => response.with_header("Retry-After", value),
        None => response,
    }
}

#[derive(Default)]
struct CountingObserver {
    requests: AtomicU32,
    retries: AtomicU32,
    errors: AtomicU32,
}

impl RequestObserver for CountingObserver {
    fn on_request(&self, _info: &RequestInfo<'_>) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn on_retry(&self, _info: &RequestInfo<'_>, _error: &StockAlertError, _delay: Duration) {
        self.retries.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, _info: &RequestInfo<'_>, _error: &StockAlertError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn when_default_scheme_is_used_key_travels_in_x_api_key_header() {
    // Given: A client with the default auth scheme
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_json(200, json!({"success": true, "data": alert_json("a1")}));
    let client = client_with(&http, config());

    // When: Any request is made
    client.alerts().get("a1").await.expect("found");

    // Then: The key is sent as X-API-Key and no bearer token is attached
    let sent = &http.requests()[0];
    assert_eq!(sent.header("X-API-Key"), Some(TEST_API_KEY));
    assert_eq!(sent.header("Authorization"), None);
    assert_eq!(sent.header("Accept"), Some("application/json"));
}

#[tokio::test]
async fn when_bearer_scheme_is_selected_key_travels_as_authorization() {
    // Given: A client configured for bearer auth
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_json(200, json!({"success": true, "data": []}));
    let client = client_with(&http, config().with_auth_scheme(AuthScheme::Bearer));

    // When: Webhooks are listed
    client.webhooks().list().await.expect("listed");

    // Then: Authorization carries the key and X-API-Key is absent
    let sent = &http.requests()[0];
    assert_eq!(sent.header("Authorization"), Some(format!("Bearer {TEST_API_KEY}").as_str()));
    assert_eq!(sent.header("X-API-Key"), None);
}

#[tokio::test]
async fn when_server_rejects_credentials_request_is_not_retried() {
    // Given: A server that answers 401
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_json(401, json!({"success": false, "error": "Invalid API key"}));
    http.push_json(200, json!({"success": true, "data": alert_json("a1")}));
    let client = client_with(&http, config());

    // When: An alert is fetched
    let err = client.alerts().get("a1").await.expect_err("must fail");

    // Then: Exactly one call was made and the error is Authentication
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.to_string(), "Invalid API key");
    assert_eq!(http.request_count(), 1);
    assert_eq!(http.remaining(), 1);
}

// =============================================================================
// Retry and Backoff
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_transport_fails_twice_third_attempt_succeeds() {
    // Given: Two connection failures followed by success, two retries allowed
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_error(HttpError::connect("connection refused"))
        .push_error(HttpError::connect("connection refused"))
        .push_json(200, json!({"success": true, "data": alert_json("a1")}));
    let client = client_with(&http, config().with_max_retries(2));
    let started = Instant::now();

    // When: The alert is fetched
    let alert = client.alerts().get("a1").await.expect("third attempt succeeds");

    // Then: Exactly three attempts were made, waiting 1s then 2s
    assert_eq!(alert.id, "a1");
    assert_eq!(http.request_count(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn when_server_keeps_failing_backoff_doubles_and_caps_at_ten_seconds() {
    // Given: A server that always answers 503 and six retries allowed
    let http = Arc::new(ScriptedHttpClient::new());
    for _ in 0..7 {
        http.push_json(503, json!({"success": false, "error": "Service unavailable"}));
    }
    let client = client_with(&http, config().with_max_retries(6));
    let started = Instant::now();

    // When: The call gives up
    let err = client.alerts().get("a1").await.expect_err("must fail");

    // Then: Seven attempts were made with waits 1+2+4+8+10+10 seconds
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(http.request_count(), 7);
    assert_eq!(started.elapsed(), Duration::from_secs(35));
}

#[tokio::test(start_paused = true)]
async fn when_max_retries_is_zero_only_one_attempt_is_made() {
    // Given: A client that never retries and a failing transport
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_error(HttpError::timeout("Request timeout"));
    let client = client_with(&http, config().with_max_retries(0));

    // When: A request is sent
    let err = client.webhooks().list().await.expect_err("must fail");

    // Then: The network error surfaces after one attempt
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(http.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn when_request_is_invalid_client_errors_are_not_retried() {
    // Given: A 400 response without field errors
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_json(400, json!({"success": false, "error": "Bad filter"}));
    let client = client_with(&http, config());

    // When: Alerts are listed
    let err = client
        .alerts()
        .list(&ListAlertsParams::new())
        .await
        .expect_err("must fail");

    // Then: The API error is returned after a single attempt
    assert_eq!(
        err,
        StockAlertError::api(
            400,
            "Bad filter",
            Some(json!({"success": false, "error": "Bad filter"}))
        )
    );
    assert_eq!(http.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn observer_sees_every_attempt_and_the_final_error() {
    // Given: An observer and a transport that fails three times
    let http = Arc::new(ScriptedHttpClient::new());
    for _ in 0..3 {
        http.push_error(HttpError::connect("refused"));
    }
    let observer = Arc::new(CountingObserver::default());
    let client = StockAlertClient::with_observer(
        config().with_max_retries(2),
        Arc::clone(&http) as _,
        Arc::clone(&observer) as _,
    )
    .expect("valid config");

    // When: The call runs out of retries
    let _ = client.alerts().get("a1").await;

    // Then: Three requests, two retries and one terminal error were reported
    assert_eq!(observer.requests.load(Ordering::SeqCst), 3);
    assert_eq!(observer.retries.load(Ordering::SeqCst), 2);
    assert_eq!(observer.errors.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn tracing_observer_runs_under_a_subscriber() {
    // Given: A test subscriber and the tracing observer
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("stockalert=debug"))
        .with_test_writer()
        .try_init();
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_json(500, json!({"success": false, "error": "boom"}))
        .push_json(200, json!({"success": true, "data": alert_json("a1")}));
    let client = StockAlertClient::with_observer(
        config(),
        Arc::clone(&http) as _,
        Arc::new(TracingObserver),
    )
    .expect("valid config");

    // When: A call recovers after one server error
    let alert = client.alerts().get("a1").await.expect("recovers");

    // Then: The observer did not interfere with the result
    assert_eq!(alert.id, "a1");
    assert_eq!(http.request_count(), 2);
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_rate_limited_later_calls_wait_out_the_cool_down_without_network() {
    // Given: A server that answers 429 with Retry-After: 60
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_response(rate_limited(Some("60")));
    http.push_json(200, json!({"success": true, "data": alert_json("a1")}));
    let client = client_with(&http, config());

    // When: The first call is rate limited
    let first = client.alerts().get("a1").await.expect_err("rate limited");

    // Then: The error carries the wait and nothing was retried
    assert_eq!(first.kind(), ErrorKind::RateLimit);
    assert_eq!(first.retry_after(), Some(Duration::from_secs(60)));
    assert_eq!(http.request_count(), 1);

    // When: The same URL is requested 30 seconds later
    tokio::time::advance(Duration::from_secs(30)).await;
    let second = client.alerts().get("a1").await.expect_err("still cooling down");

    // Then: No request is sent and the remaining wait is reported
    assert_eq!(second.retry_after(), Some(Duration::from_secs(30)));
    assert_eq!(second.to_string(), "Rate limit in effect. Please wait 30 seconds.");
    assert_eq!(http.request_count(), 1);

    // When: The cool-down has passed
    tokio::time::advance(Duration::from_secs(31)).await;
    let alert = client.alerts().get("a1").await.expect("allowed again");

    // Then: The request goes through
    assert_eq!(alert.id, "a1");
    assert_eq!(http.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn cool_down_is_tracked_per_url() {
    // Given: One URL is rate limited
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_response(rate_limited(Some("60")));
    http.push_json(200, json!({"success": true, "data": []}));
    let client = client_with(&http, config());
    let _ = client.alerts().get("a1").await;

    // When: A different endpoint is called
    let hooks = client.webhooks().list().await.expect("other URL unaffected");

    // Then: It is sent normally
    assert!(hooks.is_empty());
    assert_eq!(http.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn missing_retry_after_defaults_to_sixty_seconds() {
    // Given: A 429 without Retry-After
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_response(rate_limited(None));
    let client = client_with(&http, config());

    // When: The call is made
    let err = client.alerts().get("a1").await.expect_err("rate limited");

    // Then: The default cool-down applies
    assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
}

#[tokio::test(start_paused = true)]
async fn absurd_retry_after_is_capped_at_one_day() {
    // Given: A 429 whose Retry-After cannot be added to the clock
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_response(rate_limited(Some("18446744073709551615")));
    let client = client_with(&http, config());

    // When: The call is made, then repeated
    let first = client.alerts().get("a1").await.expect_err("rate limited");
    let second = client.alerts().get("a1").await.expect_err("cooling down");

    // Then: Both surface as rate limits bounded by one day
    assert_eq!(first.kind(), ErrorKind::RateLimit);
    assert_eq!(first.retry_after(), Some(Duration::from_secs(86_400)));
    assert_eq!(second.kind(), ErrorKind::RateLimit);
    assert_eq!(second.retry_after(), Some(Duration::from_secs(86_400)));
    assert_eq!(http.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn wait_and_retry_sleeps_retry_after_then_retries_once() {
    // Given: A client that waits out rate limits, and two 429s in a row
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_response(rate_limited(Some("5")));
    http.push_response(rate_limited(Some("5")));
    http.push_json(200, json!({"success": true, "data": alert_json("a1")}));
    let client = client_with(
        &http,
        config().with_rate_limit_retry(RateLimitRetry::WaitAndRetry {
            max_wait: Duration::from_secs(30),
        }),
    );
    let started = Instant::now();

    // When: The alert is fetched
    let err = client.alerts().get("a1").await.expect_err("second 429 propagates");

    // Then: One wait of Retry-After, one retry, then the second 429 surfaces
    assert_eq!(err.kind(), ErrorKind::RateLimit);
    assert_eq!(http.request_count(), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn wait_and_retry_recovers_when_the_window_has_passed() {
    // Given: A client that waits out rate limits, and one 429
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_response(rate_limited(Some("2")));
    http.push_json(200, json!({"success": true, "data": alert_json("a1")}));
    let client = client_with(
        &http,
        config().with_rate_limit_retry(RateLimitRetry::WaitAndRetry {
            max_wait: Duration::from_secs(30),
        }),
    );

    // When: The alert is fetched
    let alert = client.alerts().get("a1").await.expect("retried after wait");

    // Then: The retried call succeeded
    assert_eq!(alert.status, AlertStatus::Active);
    assert_eq!(http.request_count(), 2);
}

// =============================================================================
// Response Envelopes
// =============================================================================

#[tokio::test]
async fn raw_requests_share_the_envelope_rules() {
    // Given: A server answering with a single-object envelope
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_json(200, json!({"success": true, "data": {"plan": "pro"}}));
    let client = client_with(&http, config());

    // When: A raw request is sent
    let value = client
        .request(ApiRequest::get("/account").with_optional_query::<u32>("page", None))
        .await
        .expect("success");

    // Then: The data field is returned and absent query values are dropped
    assert_eq!(value, json!({"plan": "pro"}));
    assert!(http.requests()[0].query.is_empty());
}

#[tokio::test]
async fn server_field_errors_surface_as_validation() {
    // Given: A 422 with field-level errors
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_json(
        422,
        json!({"success": false, "error": "Validation failed", "errors": [
            {"field": "threshold", "message": "must be positive"}
        ]}),
    );
    let client = client_with(&http, config());

    // When: A raw create is sent
    let err = client
        .request(ApiRequest::post("/alerts").with_json(json!({"symbol": "AAPL"})))
        .await
        .expect_err("must fail");

    // Then: The field errors are joined into the message
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "Validation failed: threshold: must be positive");
}
