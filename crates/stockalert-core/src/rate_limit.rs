use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Cool-down applied when the server omits or garbles `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Longest cool-down honoured from a single `Retry-After`.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// Per-URL "retry not allowed until" instants recorded from 429 responses.
///
/// Entries are never evicted eagerly; an expired entry is simply ignored and
/// overwritten by the next 429 for the same URL.
#[derive(Debug, Default)]
pub struct RateLimitState {
    reset_at: Mutex<HashMap<String, Instant>>,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cool-down of `retry_after` starting now, capped at
    /// [`MAX_RETRY_AFTER`].
    pub fn record(&self, url: &str, retry_after: Duration) {
        let now = Instant::now();
        let Some(until) = now
            .checked_add(retry_after.min(MAX_RETRY_AFTER))
            .or_else(|| now.checked_add(DEFAULT_RETRY_AFTER))
        else {
            return;
        };
        self.lock().insert(url.to_owned(), until);
    }

    /// Time left before `url` may be requested again, if any.
    pub fn remaining(&self, url: &str) -> Option<Duration> {
        let until = *self.lock().get(url)?;
        let remaining = until.saturating_duration_since(Instant::now());
        (!remaining.is_zero()).then_some(remaining)
    }

    pub fn tracked_urls(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        self.reset_at.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parses a `Retry-After` header given in whole seconds, capped at
/// [`MAX_RETRY_AFTER`].
pub fn parse_retry_after(value: Option<&str>) -> Duration {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
        .min(MAX_RETRY_AFTER)
}

/// Rounds a pending wait up to whole seconds so callers never see "0s" while
/// the cool-down is still active.
pub fn round_up_to_secs(wait: Duration) -> Duration {
    let extra = u64::from(wait.subsec_nanos() > 0);
    Duration::from_secs(wait.as_secs().saturating_add(extra))
}
