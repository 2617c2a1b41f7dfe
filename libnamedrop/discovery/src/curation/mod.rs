mod emerging_filter;
mod track_ranking;

use itertools::Itertools;

pub use emerging_filter::*;
pub use track_ranking::*;

use crate::dto::candidate_track::CandidateTrack;

/// Keeps the first track seen for each url (or `(artist, title)` when the url is missing).
pub fn dedup(tracks: Vec<CandidateTrack>) -> Vec<CandidateTrack> {
    tracks.into_iter().unique_by(|t| t.dedup_key()).collect()
}

/// Filter, dedup, rank and cap, in that order.
pub fn curate(
    tracks: Vec<CandidateTrack>,
    filter: &EmergingFilter,
    ranking: &dyn TrackRanking,
    max_results: Option<usize>,
) -> Vec<CandidateTrack> {
    let mut tracks = dedup(filter.apply(tracks));
    // stable sort so ties keep similarity order
    tracks.sort_by(|a, b| ranking.compare(a, b));
    if let Some(max_results) = max_results {
        tracks.truncate(max_results);
    }
    tracks
}
