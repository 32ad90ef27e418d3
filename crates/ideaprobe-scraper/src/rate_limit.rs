//! Retry and pacing utilities shared by source scrapers.
//!
//! The iTunes endpoints throttle aggressively but politely: a 429 carries a
//! `Retry-After` hint. The retry loop here honors that hint, falling back to
//! exponential growth when the server stays silent. Between consecutive
//! search queries scrapers also sleep for a random duration drawn from a
//! configured range to stay under the limits in the first place.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ScraperError;

/// Cap on the exponent so the doubling never overflows.
const MAX_BACKOFF_DOUBLINGS: u32 = 32;

/// Seconds to wait before retry number `attempt` (0-based).
///
/// The larger of the exponential schedule (`base_secs * 2^attempt`) and the
/// server's own `Retry-After` request, so a polite throttle hint is never
/// undercut.
fn backoff_delay_secs(attempt: u32, base_secs: u64, server_hint_secs: Option<u64>) -> u64 {
    let exponential = base_secs.saturating_mul(2u64.saturating_pow(attempt.min(MAX_BACKOFF_DOUBLINGS)));
    exponential.max(server_hint_secs.unwrap_or(0))
}

/// Drive `operation` to completion, waiting out transient failures.
///
/// Only two error classes earn another attempt: a rate-limit response
/// (whose `retry_after_secs` feeds the wait) and network-level failures.
/// 404s, unexpected statuses, and unparseable bodies come back to the
/// caller on first occurrence since a retry cannot change them. After
/// `max_retries` additional attempts the last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let server_hint_secs = match &err {
            ScraperError::RateLimited { retry_after_secs, .. } => Some(*retry_after_secs),
            ScraperError::Http(_) => None,
            _ => return Err(err),
        };
        if attempt >= max_retries {
            return Err(err);
        }

        let wait_secs = backoff_delay_secs(attempt, base_secs, server_hint_secs);
        tracing::warn!(
            retry = attempt + 1,
            of = max_retries,
            wait_secs,
            error = %err,
            "transient error from store API, backing off"
        );
        tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        attempt += 1;
    }
}

/// Sleep for a random duration in `[min_ms, max_ms]`.
///
/// Used between consecutive queries. A degenerate range (`max <= min`)
/// sleeps exactly `min_ms`.
pub async fn query_pause(min_ms: u64, max_ms: u64) {
    let delay_ms = if max_ms > min_ms {
        rand::thread_rng().gen_range(min_ms..=max_ms)
    } else {
        min_ms
    };
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}
