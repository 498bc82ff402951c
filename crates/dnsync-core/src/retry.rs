//! Bounded retry around a single step of a run
//!
//! Clients make exactly one request per call. When a caller wants more
//! than one attempt, the reconciler wraps the call in [`RetryPolicy::run`]
//! instead. Only transient errors (see [`crate::Error::is_transient`]) are
//! retried; everything else is returned on the first failure.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Upper bound for a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Retry policy for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one (0 disables retries)
    pub max_retries: usize,

    /// Delay before the first retry; doubled for each following one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(5),
        }
    }

    /// Retry up to `max_retries` times starting at `base_delay`
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Sleep before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    ///
    /// # Parameters
    ///
    /// - `step`: Step name used in log lines
    /// - `op`: Produces a fresh future for every attempt
    pub async fn run<T, F, Fut>(&self, step: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "{} attempt {} failed: {}. Retrying in {:?}",
                        step,
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
