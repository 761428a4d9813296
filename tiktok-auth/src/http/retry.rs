//! Opt-in exponential backoff for transient transport failures.

use std::time::{Duration, SystemTime};

use reqwest_retry::{RetryDecision, RetryPolicy};

/// Exponential backoff bounded by attempt count and total elapsed time.
///
/// Only installed when the host asks for retries; the connector itself never retries.
pub struct RetryAfterPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    max_elapsed: Duration,
}

impl RetryAfterPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_elapsed: Duration::from_secs(120),
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn backoff(&self, n_past_retries: u32) -> Duration {
        let factor = 2_u32.saturating_pow(n_past_retries);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn decide(&self, elapsed: Duration, n_past_retries: u32) -> Option<Duration> {
        if n_past_retries >= self.max_retries {
            return None;
        }
        let delay = self.backoff(n_past_retries);
        (elapsed + delay <= self.max_elapsed).then_some(delay)
    }
}

impl RetryPolicy for RetryAfterPolicy {
    fn should_retry(&self, request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        let elapsed = SystemTime::now()
            .duration_since(request_start_time)
            .unwrap_or_default();

        match self.decide(elapsed, n_past_retries) {
            Some(delay) => RetryDecision::Retry {
                execute_after: SystemTime::now() + delay,
            },
            None => RetryDecision::DoNotRetry,
        }
    }
}
