use derivative::Derivative;
use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dto::related_artist::RelatedArtist;
use crate::dto::seed_query::SeedQuery;
use crate::transport::{RequestOptions, ResilientTransport, RetryPolicy, TransportError};
use crate::util::OneOrMany;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("No artists similar to \"{0}\" were found")]
    NotFound(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Deserialize)]
struct SimilarResponse {
    similarartists: Option<SimilarArtists>,
}

#[derive(Deserialize)]
struct SimilarArtists {
    #[serde(default)]
    artist: OneOrMany<RelatedArtist>,
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct SimilarityResolver {
    transport: ResilientTransport,
    base_url: String,
    #[derivative(Debug = "ignore")]
    api_key: String,
    policy: RetryPolicy,
}

impl SimilarityResolver {
    pub fn new(
        transport: ResilientTransport,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            api_key: api_key.into(),
            policy,
        }
    }

    pub(crate) fn request_url(&self, seed: &SeedQuery, limit: u32) -> String {
        format!(
            "{}?method=artist.getsimilar&artist={}&api_key={}&format=json&limit={limit}",
            self.base_url,
            urlencoding::encode(seed.as_str()),
            urlencoding::encode(&self.api_key),
        )
    }

    /// Artists the metadata service considers similar to `seed`, most similar first.
    pub async fn resolve_similar(
        &self,
        seed: &SeedQuery,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<RelatedArtist>, ResolverError> {
        let url = self.request_url(seed, limit);
        let body = self
            .transport
            .fetch_resilient(&url, &RequestOptions::default(), &self.policy, cancel)
            .await?;

        let artists = match serde_json::from_value::<SimilarResponse>(body) {
            Ok(SimilarResponse {
                similarartists: Some(similar),
            }) => similar.artist.into_vec(),
            Ok(_) => vec![],
            Err(e) => {
                warn!("Unexpected similar artists payload for {seed}: {e}");
                vec![]
            }
        };

        let artists: Vec<_> = artists
            .into_iter()
            .filter(|a| !a.name.trim().is_empty())
            .take(limit as usize)
            .collect();
        if artists.is_empty() {
            return Err(ResolverError::NotFound(seed.to_string()));
        }

        info!("Resolved {} artists similar to {seed}", artists.len());
        Ok(artists)
    }
}
