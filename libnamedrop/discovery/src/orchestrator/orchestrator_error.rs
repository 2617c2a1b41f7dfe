use thiserror::Error;

use crate::dto::seed_query::EmptySeedError;
use crate::resolver::ResolverError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error(transparent)]
    InvalidSeed(#[from] EmptySeedError),
    #[error("Discovery failed: {0}")]
    Resolution(#[from] ResolverError),
    #[error("Discovery was cancelled")]
    Cancelled,
}
