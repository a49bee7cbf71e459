//! Retry with exponential back-off and jitter for county service requests.
//!
//! [`retry_with_backoff`] wraps one request and retries it while the failure
//! is transient. Each county's [`DispatchPolicy`] sets the attempt budget and
//! the back-off base; the per-attempt timeout is applied by the client.

use std::future::Future;
use std::time::Duration;

use flparcel_core::CountyKey;

use crate::error::{FetchError, LookupError};
use crate::registry::DispatchPolicy;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for failures worth another attempt.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx, and ArcGIS
/// in-body errors with a code of 500 or above.
///
/// **Not retriable:** HTTP 4xx (429 included), in-body errors below 500,
/// and empty or malformed bodies.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Timeout => true,
        FetchError::Transport(e) => !e.is_builder(),
        FetchError::Status(code) => *code >= 500,
        FetchError::Service { code, .. } => *code >= 500,
        FetchError::MalformedBody(_) => false,
    }
}

/// Delay before the attempt following `attempt` (1-based), before jitter.
///
/// `base × 2^(attempt-1)`, capped at 30 s.
pub(crate) fn backoff_delay_ms(backoff_base: Duration, attempt: u32) -> u64 {
    let base_ms = u64::try_from(backoff_base.as_millis()).unwrap_or(u64::MAX);
    base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10))
        .min(MAX_DELAY_MS)
}

/// Runs `operation` up to `policy.max_attempts` times.
///
/// Non-retriable failures are returned after the attempt that produced them;
/// retriable ones are returned once the budget is spent. Either way the
/// error carries the number of attempts made.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    county: CountyKey,
    policy: &DispatchPolicy,
    mut operation: F,
) -> Result<T, LookupError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_attempts {
                    return Err(err.into_lookup_error(county, attempt, max_attempts));
                }
                let capped = backoff_delay_ms(policy.backoff_base, attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    county = %county,
                    attempt,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "county service transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
