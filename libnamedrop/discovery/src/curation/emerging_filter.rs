use crate::dto::candidate_track::CandidateTrack;
use crate::settings::SettingsError;

/// Half-open popularity window `lower..upper` a track's play count must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergingFilter {
    lower: u64,
    upper: u64,
}

impl EmergingFilter {
    pub fn new(lower: u64, upper: u64) -> Result<Self, SettingsError> {
        if lower >= upper {
            return Err(SettingsError::InvertedBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> u64 {
        self.lower
    }

    pub fn upper(&self) -> u64 {
        self.upper
    }

    pub fn accepts(&self, play_count: u64) -> bool {
        (self.lower..self.upper).contains(&play_count)
    }

    pub fn apply(&self, tracks: Vec<CandidateTrack>) -> Vec<CandidateTrack> {
        tracks
            .into_iter()
            .filter(|t| self.accepts(t.play_count))
            .collect()
    }
}
