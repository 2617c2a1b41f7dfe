use std::io::Error;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrateStoreError {
    #[error("Unable to locate a valid home directory")]
    NoHomeDir,
    #[error("Failed to create directory {0}: {1}")]
    DirCreationFailed(String, Error),
    #[error("{0} is not a file")]
    NotAFile(String),
}
