use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::TransportError;

/// Suspends the current run for a backoff or spacing delay.
/// Returns [`TransportError::Cancelled`] as soon as the token fires.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration, cancel: &CancellationToken)
    -> Result<(), TransportError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(
        &self,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}
