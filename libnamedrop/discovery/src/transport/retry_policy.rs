use std::time::Duration;

use super::ProxyChain;
use crate::settings::SettingsError;

/// Longest allowed `total_timeout`.
pub const MAX_TOTAL_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero means a single attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
    /// Extra `min..=max` delay added on top of the backoff when the server gives no hint.
    pub jitter: Option<(Duration, Duration)>,
    /// Fixed delay before retrying after a connection-level fault.
    pub network_retry_delay: Duration,
    /// Ceiling for one call, all attempts and waits included.
    pub total_timeout: Duration,
    pub proxy_chain: ProxyChain,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(3000),
            backoff_multiplier: 2.0,
            jitter: None,
            network_retry_delay: Duration::from_millis(1000),
            total_timeout: Duration::from_secs(60),
            proxy_chain: ProxyChain::default(),
        }
    }
}

impl RetryPolicy {
    pub fn with_proxy_chain(mut self, proxy_chain: ProxyChain) -> Self {
        self.proxy_chain = proxy_chain;
        self
    }

    pub fn with_jitter(mut self, min: Duration, max: Duration) -> Self {
        self.jitter = Some((min, max));
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.initial_backoff.is_zero() {
            return Err(SettingsError::InvalidRetryPolicy(
                "initial backoff must be greater than zero".to_owned(),
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier <= 1.0 {
            return Err(SettingsError::InvalidRetryPolicy(format!(
                "backoff multiplier must be greater than 1, got {}",
                self.backoff_multiplier
            )));
        }
        if let Some((min, max)) = self.jitter
            && min > max
        {
            return Err(SettingsError::InvalidRetryPolicy(format!(
                "jitter range is inverted: {min:?} > {max:?}"
            )));
        }
        if self.total_timeout.is_zero() {
            return Err(SettingsError::InvalidRetryPolicy(
                "total timeout must be greater than zero".to_owned(),
            ));
        }
        if self.total_timeout > MAX_TOTAL_TIMEOUT {
            return Err(SettingsError::InvalidRetryPolicy(format!(
                "total timeout must be at most {MAX_TOTAL_TIMEOUT:?}, got {:?}",
                self.total_timeout
            )));
        }
        Ok(())
    }
}
