use std::hash::{Hash, Hasher};

use libnamedrop_discovery::dto::candidate_track::{CandidateTrack, TrackId};
use serde::{Deserialize, Serialize};

/// A track the listener saved to their crate. Two pins are the same pin when their urls match,
/// whatever else changed upstream since.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinnedTrack(CandidateTrack);

impl PinnedTrack {
    pub fn id(&self) -> TrackId {
        self.0.id()
    }

    pub fn track(&self) -> &CandidateTrack {
        &self.0
    }

    pub fn into_track(self) -> CandidateTrack {
        self.0
    }
}

impl From<CandidateTrack> for PinnedTrack {
    fn from(track: CandidateTrack) -> Self {
        Self(track)
    }
}

impl PartialEq for PinnedTrack {
    fn eq(&self, other: &Self) -> bool {
        self.0.url == other.0.url
    }
}

impl Eq for PinnedTrack {}

impl Hash for PinnedTrack {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.url.hash(state);
    }
}
