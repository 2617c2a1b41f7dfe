use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Still rate limited after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },
    #[error("Request failed with status {0}")]
    HttpError(u16),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Response body could not be decoded: {0}")]
    MalformedBody(String),
    #[error("Request was cancelled")]
    Cancelled,
}
