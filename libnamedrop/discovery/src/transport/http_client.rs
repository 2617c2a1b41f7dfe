use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest_retry::{Retryable, default_on_request_failure};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub retry_after: Option<Duration>,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            retry_after: None,
            body: String::new(),
        }
    }
}

/// The request never produced a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchFault {
    pub retryable: bool,
    pub message: String,
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, request: &OutboundRequest) -> Result<RawResponse, FetchFault>;
}

pub struct ReqwestHttpClient {
    client: reqwest_middleware::ClientWithMiddleware,
}

impl ReqwestHttpClient {
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        // no retry middleware, ResilientTransport owns the retry budget
        let client = reqwest_middleware::ClientBuilder::new(client).build();
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, request: &OutboundRequest) -> Result<RawResponse, FetchFault> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let response = builder.send().await.map_err(classify_fault)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);
        let body = response
            .text()
            .await
            .map_err(|e| classify_fault(reqwest_middleware::Error::Reqwest(e)))?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

fn classify_fault(error: reqwest_middleware::Error) -> FetchFault {
    let retryable = matches!(
        default_on_request_failure(&error),
        Some(Retryable::Transient)
    );
    FetchFault {
        retryable,
        message: error.to_string(),
    }
}

const MAX_RETRY_AFTER_SECS: u64 = 24 * 60 * 60;

// Only the delta-seconds form is honored, http dates fall back to the computed backoff
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS)))
}
