//! Retry with exponential back-off and jitter for Maps requests.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx, Google `UNKNOWN_ERROR`). Quota and
//! request errors are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::MapsError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx, and the
/// `UNKNOWN_ERROR` status Google documents as "may succeed if you try again".
///
/// **Not retriable:** every other API status (`ZERO_RESULTS`,
/// `OVER_QUERY_LIMIT`, `REQUEST_DENIED`, ...), malformed bodies and
/// configuration errors.
pub(crate) fn is_retriable(err: &MapsError) -> bool {
    match err {
        MapsError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        MapsError::Status { status, .. } => status == "UNKNOWN_ERROR",
        MapsError::Deserialize { .. }
        | MapsError::Polyline(_)
        | MapsError::InvalidBaseUrl { .. }
        | MapsError::MissingApiKey
        | MapsError::Dataset(_) => false,
    }
}

/// Longest sleep between two attempts, before jitter.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Delay before retry number `retry` (1-based). `jitter` is a factor in
/// `0.75..1.25`.
///
/// With the default `backoff_base_ms = 500`:
///
/// | Retry | Delay before jitter |
/// |-------|---------------------|
/// | 1     | 500 ms              |
/// | 2     | 1 s                 |
/// | 3     | 2 s                 |
/// | 7+    | 30 s (cap)          |
fn backoff_delay(retry: u32, backoff_base_ms: u64, jitter: f64) -> Duration {
    let exponent = retry.saturating_sub(1).min(16);
    let base = Duration::from_millis(backoff_base_ms.saturating_mul(1 << exponent));
    base.min(MAX_DELAY).mul_f64(jitter)
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
/// Anything [`is_retriable`] rejects is returned on the spot.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, MapsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MapsError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if retry < max_retries && is_retriable(&err) => err,
            Err(err) => return Err(err),
        };
        retry += 1;
        let delay = backoff_delay(retry, backoff_base_ms, rand::random_range(0.75..1.25));
        tracing::warn!(
            retry,
            max_retries,
            ?delay,
            error = %err,
            "Maps request failed, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
