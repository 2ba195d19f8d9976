//! Generic retry with a fixed-delay schedule.
//!
//! Policy is separated from call sites: a [`RetryPolicy`] is a plain value
//! consumed by [`RetryPolicy::run`], so call sites stay free of sleep loops
//! and tests can exercise the schedule with zero-delay policies.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

/// Classifies errors as worth retrying or terminal.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Fixed-delay retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Per-request policy: 3 attempts with a short pause between them.
    pub fn standard() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }

    /// Outer policy for call sites that must not give up on a flaky upstream:
    /// after a failure, cool down for a minute and try again, up to 20
    /// additional times.
    pub fn persistent() -> Self {
        Self {
            max_attempts: 21,
            delay: Duration::from_secs(60),
        }
    }

    /// Zero-delay policy, for tests.
    pub fn no_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    /// Run a fallible operation under this policy. Terminal errors and
    /// exhausted attempts propagate the last error to the caller; there is no
    /// silent fallback.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts.max(1) || !err.is_retryable() {
                        return Err(err);
                    }
                    warn!(attempt, error = %err, "attempt failed, retrying");
                    sleep(self.delay).await;
                }
            }
        }
    }
}
