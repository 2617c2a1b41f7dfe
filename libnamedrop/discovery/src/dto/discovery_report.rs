use std::collections::HashMap;

use crate::dto::candidate_track::{CandidateTrack, TrackId};
use crate::dto::discovery_event::SkippedArtist;
use crate::dto::related_artist::RelatedArtist;
use crate::dto::seed_query::SeedQuery;

pub const NONE_FOUND_MESSAGE: &str = "No emerging tracks found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub seed: SeedQuery,
    pub related: Vec<RelatedArtist>,
    pub tracks: Vec<CandidateTrack>,
    pub skipped: Vec<SkippedArtist>,
}

impl DiscoveryReport {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Message shown in place of results when nothing survived curation.
    pub fn status_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(NONE_FOUND_MESSAGE)
    }

    pub fn index(&self) -> TrackIndex {
        TrackIndex::new(&self.tracks)
    }
}

/// Lookup from [`TrackId`] to the rendered track so UI handlers only need to carry the id.
#[derive(Debug, Clone, Default)]
pub struct TrackIndex {
    tracks: HashMap<TrackId, CandidateTrack>,
}

impl TrackIndex {
    pub fn new(tracks: &[CandidateTrack]) -> Self {
        let mut index = HashMap::with_capacity(tracks.len());
        for track in tracks.iter().filter(|t| t.has_url()) {
            index.entry(track.id()).or_insert_with(|| track.clone());
        }
        Self { tracks: index }
    }

    pub fn get(&self, id: &TrackId) -> Option<&CandidateTrack> {
        self.tracks.get(id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
