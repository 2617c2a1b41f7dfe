use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Popularity bounds are inverted: lower {lower} must be below upper {upper}")]
    InvertedBounds { lower: u64, upper: u64 },
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
    #[error("Invalid proxy chain: {0}")]
    InvalidProxyChain(String),
    #[error("Missing credential {0}")]
    MissingCredential(&'static str),
}
