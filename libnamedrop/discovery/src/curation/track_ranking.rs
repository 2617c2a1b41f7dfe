use std::cmp::Ordering;

use crate::dto::candidate_track::CandidateTrack;

/// Ordering applied to the curated list. Sorting is stable, so returning
/// [`Ordering::Equal`] keeps similarity order.
pub trait TrackRanking: Send + Sync {
    fn compare(&self, a: &CandidateTrack, b: &CandidateTrack) -> Ordering;
}

/// Least played first.
#[derive(Debug, Clone, Copy, Default)]
pub struct AscendingPopularity;

impl TrackRanking for AscendingPopularity {
    fn compare(&self, a: &CandidateTrack, b: &CandidateTrack) -> Ordering {
        a.play_count.cmp(&b.play_count)
    }
}

/// Artist similarity order, then the search service's own order within an artist.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionOrder;

impl TrackRanking for InsertionOrder {
    fn compare(&self, _: &CandidateTrack, _: &CandidateTrack) -> Ordering {
        Ordering::Equal
    }
}

impl<F> TrackRanking for F
where
    F: Fn(&CandidateTrack, &CandidateTrack) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &CandidateTrack, b: &CandidateTrack) -> Ordering {
        self(a, b)
    }
}
