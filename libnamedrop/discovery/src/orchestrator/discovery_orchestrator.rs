use std::sync::{Arc, Mutex, PoisonError};

use derivative::Derivative;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::OrchestratorError;
use super::phase_tracker::PhaseTracker;
use crate::curation::curate;
use crate::dto::discovery_event::{DiscoveryEvent, DiscoveryPhase, SkippedArtist};
use crate::dto::discovery_report::DiscoveryReport;
use crate::dto::seed_query::SeedQuery;
use crate::resolver::{ResolverError, SimilarityResolver};
use crate::search::CandidateSearch;
use crate::settings::{Credentials, DiscoverySettings, SettingsError};
use crate::transport::{ResilientTransport, Sleeper, TransportError};

#[derive(Default)]
struct ActiveRun {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Turns one seed artist into a curated list of emerging tracks.
///
/// Artist searches run strictly one after another with `search_spacing` between them. Starting
/// a new run cancels the one in flight, and every run aggregates into its own buffer.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DiscoveryOrchestrator {
    resolver: SimilarityResolver,
    search: CandidateSearch,
    settings: DiscoverySettings,
    #[derivative(Debug = "ignore")]
    sleeper: Arc<dyn Sleeper>,
    #[derivative(Debug = "ignore")]
    active: Mutex<ActiveRun>,
    event_tx: broadcast::Sender<DiscoveryEvent>,
}

impl DiscoveryOrchestrator {
    pub fn new(
        credentials: &Credentials,
        settings: DiscoverySettings,
        transport: ResilientTransport,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;

        let resolver = SimilarityResolver::new(
            transport.clone(),
            &settings.resolver_url,
            &credentials.lastfm_api_key,
            settings.resolver_policy.clone(),
        );
        let search = CandidateSearch::new(
            transport.clone(),
            &settings.search_url,
            &credentials.soundcloud_client_id,
            settings.search_policy.clone(),
            settings.popularity,
        )
        .with_qualifier(settings.search_qualifier.clone())
        .with_fallback_genre(&settings.fallback_genre);

        Ok(Self::from_parts(
            resolver,
            search,
            settings,
            transport.sleeper().clone(),
        ))
    }

    pub fn from_parts(
        resolver: SimilarityResolver,
        search: CandidateSearch,
        settings: DiscoverySettings,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(32);
        Self {
            resolver,
            search,
            settings,
            sleeper,
            active: Mutex::new(ActiveRun::default()),
            event_tx,
        }
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent> {
        self.event_tx.subscribe()
    }

    /// Abandons the run in flight, if any.
    pub fn cancel(&self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = active.token.take() {
            info!("Cancelling active discovery run");
            token.cancel();
        }
    }

    /// Parses raw user input and runs discovery for it.
    pub async fn discover(&self, raw_seed: &str) -> Result<DiscoveryReport, OrchestratorError> {
        let seed = SeedQuery::parse(raw_seed)?;
        self.run_discovery(&seed).await
    }

    pub async fn run_discovery(
        &self,
        seed: &SeedQuery,
    ) -> Result<DiscoveryReport, OrchestratorError> {
        let (generation, cancel) = self.begin_run();
        let result = self.run(seed, &cancel).await;
        self.end_run(generation);

        if let Err(e) = &result {
            warn!("Discovery for {seed} ended without results: {e}");
        }
        result
    }

    fn begin_run(&self) -> (u64, CancellationToken) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.token.take() {
            info!("Superseding discovery run {}", active.generation);
            previous.cancel();
        }
        active.generation += 1;
        let token = CancellationToken::new();
        active.token = Some(token.clone());
        (active.generation, token)
    }

    fn end_run(&self, generation: u64) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.generation == generation {
            active.token = None;
        }
    }

    async fn run(
        &self,
        seed: &SeedQuery,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryReport, OrchestratorError> {
        let mut tracker = PhaseTracker::new(seed.as_str(), &self.event_tx);

        tracker.advance(DiscoveryPhase::ResolvingArtists);
        let related = match self
            .resolver
            .resolve_similar(seed, self.settings.similar_artist_limit, cancel)
            .await
        {
            Ok(related) => related,
            Err(ResolverError::Transport(TransportError::Cancelled)) => {
                return Err(OrchestratorError::Cancelled);
            }
            Err(e) => {
                error!("Could not resolve artists similar to {seed}: {e}");
                tracker.advance(DiscoveryPhase::Failed);
                return Err(OrchestratorError::Resolution(e));
            }
        };

        let total = related.len();
        let mut buffer = Vec::new();
        let mut skipped = Vec::new();
        for (index, artist) in related.iter().enumerate() {
            if index > 0 {
                self.sleeper
                    .sleep(self.settings.search_spacing, cancel)
                    .await
                    .map_err(|_| OrchestratorError::Cancelled)?;
            }

            tracker.advance(DiscoveryPhase::SearchingArtist { index, total });
            let batch = self
                .search
                .search_candidates(artist, self.settings.per_artist_limit, cancel)
                .await;
            if cancel.is_cancelled() {
                return Err(OrchestratorError::Cancelled);
            }

            match batch.skipped {
                Some(reason) => {
                    let skip = SkippedArtist {
                        artist: batch.artist,
                        reason,
                    };
                    tracker.emit(DiscoveryEvent::ArtistSkipped(skip.clone()));
                    skipped.push(skip);
                }
                None => buffer.extend(batch.candidates),
            }
        }

        tracker.advance(DiscoveryPhase::Aggregating);
        let tracks = curate(
            buffer,
            &self.settings.popularity,
            self.settings.ranking.as_ref(),
            self.settings.max_results,
        );
        tracker.advance(DiscoveryPhase::Done);

        info!(
            "Discovery for {seed} found {} tracks across {total} artists ({} skipped)",
            tracks.len(),
            skipped.len()
        );
        Ok(DiscoveryReport {
            seed: seed.clone(),
            related,
            tracks,
            skipped,
        })
    }
}
