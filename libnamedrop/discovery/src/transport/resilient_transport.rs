use std::sync::Arc;
use std::time::Duration;

use derivative::Derivative;
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::proxy::Route;
use super::retry_state::RetryState;
use super::{
    HttpClient, MAX_TOTAL_TIMEOUT, RawResponse, RetryPolicy, Sleeper, TokioSleeper, TransportError,
};

const TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

enum AttemptFailure {
    Throttled { retry_after: Option<Duration> },
    Fault { retryable: bool, message: String },
    Fatal(TransportError),
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ResilientTransport {
    #[derivative(Debug = "ignore")]
    client: Arc<dyn HttpClient>,
    #[derivative(Debug = "ignore")]
    sleeper: Arc<dyn Sleeper>,
}

impl ResilientTransport {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub(crate) fn sleeper(&self) -> &Arc<dyn Sleeper> {
        &self.sleeper
    }

    /// Fetches `target_url` and returns its JSON body, retrying throttled responses with growing
    /// backoff and rotating through the policy's proxy chain between attempts.
    pub async fn fetch_resilient(
        &self,
        target_url: &str,
        options: &RequestOptions,
        policy: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Value, TransportError> {
        let deadline = Instant::now() + policy.total_timeout.min(MAX_TOTAL_TIMEOUT);
        let mut state = RetryState::new(policy);

        loop {
            if cancel.is_cancelled() {
                return Err(TransportError::Cancelled);
            }

            let route = policy.proxy_chain.route(state.proxy_index);
            debug!(
                url = target_url,
                proxy = route.label(),
                attempts_remaining = state.attempts_remaining,
                "sending request"
            );

            let failure = match self.attempt(&route, target_url, options, deadline, cancel).await {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            let (wait, exhausted) = match failure {
                AttemptFailure::Fatal(e) => return Err(e),
                AttemptFailure::Throttled { retry_after } => {
                    let exhausted = TransportError::RateLimitExceeded {
                        attempts: state.attempts_made(policy),
                    };
                    if !state.can_retry() {
                        warn!(url = target_url, "rate limit retries exhausted");
                        return Err(exhausted);
                    }
                    (state.throttle_wait(retry_after, policy), exhausted)
                }
                AttemptFailure::Fault { retryable, message } => {
                    if !retryable || !state.can_retry() {
                        return Err(TransportError::NetworkError(message));
                    }
                    (
                        policy.network_retry_delay,
                        TransportError::NetworkError(message),
                    )
                }
            };

            let within_deadline = Instant::now()
                .checked_add(wait)
                .is_some_and(|resume_at| resume_at <= deadline);
            if !within_deadline {
                warn!(
                    url = target_url,
                    wait_ms = wait.as_millis() as u64,
                    "next retry would exceed the request ceiling"
                );
                return Err(exhausted);
            }

            info!(
                url = target_url,
                proxy = route.label(),
                wait_ms = wait.as_millis() as u64,
                reason = %exhausted,
                "retrying request"
            );
            self.sleeper.sleep(wait, cancel).await?;

            match exhausted {
                TransportError::RateLimitExceeded { .. } => state.after_throttle(policy),
                _ => state.after_fault(policy),
            }
        }
    }

    async fn attempt(
        &self,
        route: &Route<'_>,
        target_url: &str,
        options: &RequestOptions,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<Value, AttemptFailure> {
        let request = route.request(target_url, &options.headers);
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(AttemptFailure::Fatal(TransportError::Cancelled));
            }
            response = tokio::time::timeout_at(deadline, self.client.get(&request)) => response,
        };

        let response = match response {
            Ok(Ok(response)) => response,
            Ok(Err(fault)) => {
                warn!(url = target_url, proxy = route.label(), "request fault: {fault}");
                return Err(AttemptFailure::Fault {
                    retryable: fault.retryable,
                    message: fault.message,
                });
            }
            Err(_) => {
                return Err(AttemptFailure::Fatal(TransportError::NetworkError(
                    "request ceiling elapsed".to_owned(),
                )));
            }
        };

        let RawResponse {
            status,
            retry_after,
            body,
        } = route.unwrap(response).map_err(AttemptFailure::Fatal)?;

        if status == TOO_MANY_REQUESTS {
            warn!(url = target_url, proxy = route.label(), ?retry_after, "throttled");
            return Err(AttemptFailure::Throttled { retry_after });
        }
        if !(200..300).contains(&status) {
            warn!(url = target_url, proxy = route.label(), status, "request failed");
            return Err(AttemptFailure::Fatal(TransportError::HttpError(status)));
        }

        serde_json::from_str(&body)
            .map_err(|e| AttemptFailure::Fatal(TransportError::MalformedBody(e.to_string())))
    }
}
