//! Retry with exponential backoff for transient fetch failures.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` for conditions worth retrying: network-level failures and
/// 5xx / 429 responses. 4xx responses (other than 429) and parse failures
/// are returned immediately.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        ScraperError::Deserialize { .. } | ScraperError::FeedShape { .. } => false,
    }
}

/// `base * 2^attempt`, saturating. The shift is capped so an absurd
/// configured retry count cannot overflow the shift itself.
fn backoff_delay_secs(base: u64, attempt: u32) -> u64 {
    base.saturating_mul(1u64 << attempt.min(62))
}

/// Executes `operation`, sleeping `backoff_base_secs * 2^attempt` seconds
/// between attempts, up to `max_retries` additional attempts after the
/// first. The last error is returned when all attempts fail.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries && is_retriable(&err) => {
                let delay = backoff_delay_secs(backoff_base_secs, attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries,
                    delay_secs = delay,
                    error = %err,
                    "transient fetch failure, backing off"
                );
                tokio::time::sleep(Duration::from_secs(delay)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
