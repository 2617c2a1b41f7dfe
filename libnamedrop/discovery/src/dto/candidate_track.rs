use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Url of a track, used as its identity wherever tracks are compared or pinned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tempo {
    Bpm(u16),
    #[default]
    Unknown,
}

impl Tempo {
    pub(crate) fn from_hint(hint: Option<f64>) -> Self {
        match hint {
            Some(bpm) if bpm.is_finite() && bpm > 0.0 && bpm <= u16::MAX as f64 => {
                Tempo::Bpm(bpm.round() as u16)
            }
            _ => Tempo::Unknown,
        }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tempo::Bpm(bpm) => write!(f, "{bpm}"),
            Tempo::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for Tempo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tempo::Bpm(bpm) => serializer.serialize_u16(*bpm),
            Tempo::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for Tempo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
            Null,
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Number(bpm) => Tempo::from_hint(Some(bpm)),
            Repr::Text(text) => Tempo::from_hint(text.trim().parse().ok()),
            Repr::Null => Tempo::Unknown,
        })
    }
}

/// Key used to collapse duplicates across a run. Tracks without a url fall back to an exact
/// `(artist, title)` match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Url(String),
    Composite(String, String),
}

/// Genre label used when a track carries none.
pub const DEFAULT_GENRE: &str = "Bass";

fn default_genre() -> String {
    DEFAULT_GENRE.to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTrack {
    pub artist: String,
    pub title: String,
    #[serde(rename = "plays", default)]
    pub play_count: u64,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "genre", default = "default_genre")]
    pub genre_tag: String,
    #[serde(rename = "bpm", default)]
    pub tempo: Tempo,
}

impl CandidateTrack {
    pub fn id(&self) -> TrackId {
        TrackId::new(self.url.clone())
    }

    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }

    pub fn dedup_key(&self) -> DedupKey {
        if self.has_url() {
            DedupKey::Url(self.url.clone())
        } else {
            DedupKey::Composite(self.artist.clone(), self.title.clone())
        }
    }
}
