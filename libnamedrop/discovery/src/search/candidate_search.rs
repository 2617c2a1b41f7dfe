use derivative::Derivative;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::track_mapping::{extract_items, map_track};
use crate::curation::EmergingFilter;
use crate::dto::candidate_track::{CandidateTrack, DEFAULT_GENRE};
use crate::dto::related_artist::RelatedArtist;
use crate::transport::{RequestOptions, ResilientTransport, RetryPolicy, TransportError};

/// Result of searching one related artist. A failed search is reported here instead of
/// being returned as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistBatch {
    pub artist: RelatedArtist,
    pub candidates: Vec<CandidateTrack>,
    pub skipped: Option<TransportError>,
}

impl ArtistBatch {
    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct CandidateSearch {
    transport: ResilientTransport,
    search_url: String,
    #[derivative(Debug = "ignore")]
    client_id: String,
    policy: RetryPolicy,
    filter: EmergingFilter,
    qualifier: Option<String>,
    fallback_genre: String,
}

impl CandidateSearch {
    pub fn new(
        transport: ResilientTransport,
        search_url: impl Into<String>,
        client_id: impl Into<String>,
        policy: RetryPolicy,
        filter: EmergingFilter,
    ) -> Self {
        Self {
            transport,
            search_url: search_url.into(),
            client_id: client_id.into(),
            policy,
            filter,
            qualifier: None,
            fallback_genre: DEFAULT_GENRE.to_owned(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: Option<String>) -> Self {
        self.qualifier = qualifier.filter(|q| !q.trim().is_empty());
        self
    }

    pub fn with_fallback_genre(mut self, fallback_genre: impl Into<String>) -> Self {
        self.fallback_genre = fallback_genre.into();
        self
    }

    pub(crate) fn query_for(&self, artist: &RelatedArtist) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{} {}", artist.name.trim(), qualifier.trim()),
            None => artist.name.trim().to_owned(),
        }
    }

    pub(crate) fn request_url(&self, artist: &RelatedArtist, limit: u32) -> String {
        format!(
            "{}?q={}&client_id={}&limit={limit}",
            self.search_url,
            urlencoding::encode(&self.query_for(artist)),
            urlencoding::encode(&self.client_id),
        )
    }

    /// Searches tracks for one artist and keeps the ones inside the popularity window.
    /// Transport failures produce an empty, skipped batch.
    pub async fn search_candidates(
        &self,
        artist: &RelatedArtist,
        per_artist_limit: u32,
        cancel: &CancellationToken,
    ) -> ArtistBatch {
        let url = self.request_url(artist, per_artist_limit);
        match self
            .transport
            .fetch_resilient(&url, &RequestOptions::default(), &self.policy, cancel)
            .await
        {
            Ok(body) => {
                let candidates = self.map_batch(body, artist, per_artist_limit);
                info!(
                    artist = %artist.name,
                    kept = candidates.len(),
                    "search finished"
                );
                ArtistBatch {
                    artist: artist.clone(),
                    candidates,
                    skipped: None,
                }
            }
            Err(e) => {
                warn!(artist = %artist.name, "Skipping artist: {e}");
                ArtistBatch {
                    artist: artist.clone(),
                    candidates: vec![],
                    skipped: Some(e),
                }
            }
        }
    }

    fn map_batch(&self, body: Value, artist: &RelatedArtist, limit: u32) -> Vec<CandidateTrack> {
        extract_items(body)
            .iter()
            .take(limit as usize)
            .filter_map(|item| map_track(item, artist, &self.fallback_genre))
            .filter(|track| self.filter.accepts(track.play_count))
            .collect()
    }
}
