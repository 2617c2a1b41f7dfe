use strum::Display;

use crate::dto::related_artist::RelatedArtist;
use crate::transport::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DiscoveryPhase {
    Idle,
    ResolvingArtists,
    #[strum(to_string = "SearchingArtist({index}/{total})")]
    SearchingArtist {
        index: usize,
        total: usize,
    },
    Aggregating,
    Done,
    Failed,
}

impl DiscoveryPhase {
    pub(crate) fn can_advance_to(&self, next: &DiscoveryPhase) -> bool {
        use DiscoveryPhase::*;

        match (self, next) {
            (Idle | Done | Failed, ResolvingArtists) => true,
            (ResolvingArtists, Failed) => true,
            (ResolvingArtists, SearchingArtist { index: 0, .. }) => true,
            (ResolvingArtists, Aggregating) => true,
            (
                SearchingArtist { index, total },
                SearchingArtist {
                    index: next_index,
                    total: next_total,
                },
            ) => *next_index == index + 1 && next_total == total,
            (SearchingArtist { .. }, Aggregating) => true,
            (Aggregating, Done) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArtist {
    pub artist: RelatedArtist,
    pub reason: TransportError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    PhaseChanged(DiscoveryPhase),
    ArtistSkipped(SkippedArtist),
}
