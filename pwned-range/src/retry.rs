use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::Error;
use crate::range::{Match, RangeQuery};

/// Default number of extra attempts for a failed query.
pub const MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff (doubles each retry).
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Retries transient range query failures with exponential backoff.
///
/// Only errors for which [`Error::is_retryable`] holds are retried; anything
/// else is returned on the first attempt. Sleeps block the calling thread.
pub struct Retry<Q> {
    inner: Q,
    max_retries: u32,
    base_delay: Duration,
}

impl<Q: RangeQuery> Retry<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner, max_retries: MAX_RETRIES, base_delay: RETRY_BASE_DELAY }
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn into_inner(self) -> Q {
        self.inner
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1 << attempt.min(10))
    }
}

impl<Q: RangeQuery> RangeQuery for Retry<Q> {
    fn range(&self, digest: &str) -> Result<Vec<Match>, Error> {
        let mut attempt = 0;
        loop {
            match self.inner.range(digest) {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay(attempt);
                    warn!(error = %e, attempt, max_retries = self.max_retries, ?delay, "retrying range query");
                    thread::sleep(delay);
                }
                result => return result,
            }
        }
    }
}
