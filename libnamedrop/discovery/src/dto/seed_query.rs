use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Enter an artist name to start discovering")]
pub struct EmptySeedError;

/// Free-text artist name a discovery run starts from. Always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeedQuery(String);

impl SeedQuery {
    pub fn parse(raw: &str) -> Result<Self, EmptySeedError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptySeedError);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for SeedQuery {
    type Error = EmptySeedError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
