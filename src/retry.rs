//! Retry policy for transport-level failures.
//!
//! The reference behavior retries forever with a fixed five-second delay: a
//! transport outage stalls one query until connectivity returns rather than
//! recording a spurious failure data point. Bounded policies exist for tests.

use std::time::Duration;

pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` means retry without limit.
    pub max_attempts: Option<u32>,
    /// Fixed delay between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn unbounded(backoff: Duration) -> Self {
        RetryPolicy { max_attempts: None, backoff }
    }

    pub fn bounded(max_attempts: u32, backoff: Duration) -> Self {
        RetryPolicy { max_attempts: Some(max_attempts), backoff }
    }

    /// Whether another attempt is allowed after `attempts` have already run.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        match self.max_attempts {
            None => true,
            Some(max) => attempts < max,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::unbounded(DEFAULT_BACKOFF)
    }
}
