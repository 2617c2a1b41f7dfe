use std::time::Duration;

use rand::Rng;

use super::RetryPolicy;

/// Bookkeeping for one logical request. Never outlives the call that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RetryState {
    pub(crate) attempts_remaining: u32,
    pub(crate) backoff: Duration,
    pub(crate) proxy_index: usize,
}

impl RetryState {
    pub(crate) fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempts_remaining: policy.max_retries,
            backoff: policy.initial_backoff,
            proxy_index: 0,
        }
    }

    pub(crate) fn can_retry(&self) -> bool {
        self.attempts_remaining > 0
    }

    pub(crate) fn attempts_made(&self, policy: &RetryPolicy) -> u32 {
        policy.max_retries - self.attempts_remaining + 1
    }

    pub(crate) fn throttle_wait(&self, retry_after: Option<Duration>, policy: &RetryPolicy) -> Duration {
        if let Some(hint) = retry_after {
            return hint;
        }
        match policy.jitter {
            Some((min, max)) if max > min => self
                .backoff
                .saturating_add(rand::rng().random_range(min..=max)),
            Some((min, _)) => self.backoff.saturating_add(min),
            None => self.backoff,
        }
    }

    pub(crate) fn after_throttle(&mut self, policy: &RetryPolicy) {
        self.attempts_remaining -= 1;
        // capped at the call ceiling
        let grown = Duration::try_from_secs_f64(
            self.backoff.as_secs_f64() * policy.backoff_multiplier,
        )
        .unwrap_or(Duration::MAX);
        self.backoff = grown.min(policy.total_timeout);
        self.advance_proxy(policy);
    }

    pub(crate) fn after_fault(&mut self, policy: &RetryPolicy) {
        self.attempts_remaining -= 1;
        self.advance_proxy(policy);
    }

    fn advance_proxy(&mut self, policy: &RetryPolicy) {
        let len = policy.proxy_chain.len();
        if len > 0 {
            self.proxy_index = (self.proxy_index + 1) % len;
        }
    }
}
