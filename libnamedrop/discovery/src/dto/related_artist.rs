use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedArtist {
    pub name: String,
}

impl RelatedArtist {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
