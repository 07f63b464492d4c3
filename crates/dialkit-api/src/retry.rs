//! Retry with exponential backoff for transient API failures.
//!
//! Non-retriable errors (auth failures, 4xx statuses, body/deserialize
//! problems) are propagated immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable:
/// - [`ApiError::RateLimited`] — HTTP 429; the server asked us to back off.
/// - [`ApiError::Http`] — network-level failure (connection reset, timeout).
/// - [`ApiError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else is returned immediately: retrying a 4xx, an auth
/// rejection, or a body that does not parse would yield the same result.
fn is_retriable(err: &ApiError) -> bool {
    match err {
        ApiError::RateLimited { .. } | ApiError::Http(_) => true,
        ApiError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts after
/// the first try. When retries are exhausted the last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }

                // Exponential backoff: base * 2^attempt seconds, with the
                // shift clamped so extreme configs cannot overflow.
                let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
                tracing::warn!(
                    attempt,
                    delay_secs,
                    error = %err,
                    "transient API failure; retrying"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                attempt += 1;
            }
        }
    }
}
