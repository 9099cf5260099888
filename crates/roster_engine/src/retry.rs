use std::time::Duration;

use engine_logging::engine_warn;
use roster_core::{Page, QueryKey, Record};

use crate::{FetchError, PageFetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; grows linearly with each attempt.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }
}

/// Fetches a page, retrying network failures, timeouts and 5xx responses.
///
/// The last error is returned once `policy.max_retries` extra attempts are used up.
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    policy: &RetryPolicy,
    key: &QueryKey,
    page: u32,
) -> Result<Page<Record>, FetchError> {
    let mut attempt = 0;
    loop {
        match fetcher.fetch_page(key, page).await {
            Ok(fetched) => return Ok(fetched),
            Err(err) if err.kind.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                engine_warn!(
                    "Page {} of {} failed ({}); retry {}/{}",
                    page,
                    key,
                    err,
                    attempt,
                    policy.max_retries
                );
                tokio::time::sleep(policy.backoff.saturating_mul(attempt)).await;
            }
            Err(err) => return Err(err),
        }
    }
}
