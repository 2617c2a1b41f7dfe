mod credentials;
mod settings_error;

use std::sync::Arc;
use std::time::Duration;

pub use credentials::*;
use derivative::Derivative;
pub use settings_error::*;

use crate::curation::{AscendingPopularity, EmergingFilter, TrackRanking};
use crate::dto::candidate_track::DEFAULT_GENRE;
use crate::transport::RetryPolicy;

pub const LASTFM_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const SOUNDCLOUD_SEARCH_URL: &str = "https://api-v2.soundcloud.com/search/tracks";

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct DiscoverySettings {
    /// Popularity window a track must fall into. Required because play counts and listener
    /// counts live on different scales.
    pub popularity: EmergingFilter,
    pub similar_artist_limit: u32,
    pub per_artist_limit: u32,
    /// Pause between consecutive artist searches.
    pub search_spacing: Duration,
    /// Appended to every artist search, e.g. `"remix"`.
    pub search_qualifier: Option<String>,
    pub fallback_genre: String,
    #[derivative(Debug = "ignore")]
    pub ranking: Arc<dyn TrackRanking>,
    pub max_results: Option<usize>,
    pub resolver_url: String,
    pub search_url: String,
    pub resolver_policy: RetryPolicy,
    pub search_policy: RetryPolicy,
}

impl DiscoverySettings {
    pub fn new(popularity: EmergingFilter) -> Self {
        Self {
            popularity,
            similar_artist_limit: 5,
            per_artist_limit: 3,
            search_spacing: Duration::from_millis(2500),
            search_qualifier: None,
            fallback_genre: DEFAULT_GENRE.to_owned(),
            ranking: Arc::new(AscendingPopularity),
            max_results: None,
            resolver_url: LASTFM_BASE_URL.to_owned(),
            search_url: SOUNDCLOUD_SEARCH_URL.to_owned(),
            // the metadata service is not the throttled one, keep its retries short
            resolver_policy: RetryPolicy {
                max_retries: 2,
                ..Default::default()
            },
            search_policy: RetryPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.similar_artist_limit == 0 {
            return Err(SettingsError::ZeroLimit("similar_artist_limit"));
        }
        if self.per_artist_limit == 0 {
            return Err(SettingsError::ZeroLimit("per_artist_limit"));
        }
        if self.max_results == Some(0) {
            return Err(SettingsError::ZeroLimit("max_results"));
        }
        self.resolver_policy.validate()?;
        self.search_policy.validate()
    }
}
