use tap::TapFallible;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::dto::discovery_event::{DiscoveryEvent, DiscoveryPhase};

pub(crate) struct PhaseTracker<'a> {
    phase: DiscoveryPhase,
    seed: &'a str,
    event_tx: &'a broadcast::Sender<DiscoveryEvent>,
}

impl<'a> PhaseTracker<'a> {
    pub(crate) fn new(seed: &'a str, event_tx: &'a broadcast::Sender<DiscoveryEvent>) -> Self {
        Self {
            phase: DiscoveryPhase::Idle,
            seed,
            event_tx,
        }
    }

    pub(crate) fn advance(&mut self, next: DiscoveryPhase) {
        debug_assert!(
            self.phase.can_advance_to(&next),
            "invalid discovery transition {} -> {next}",
            self.phase
        );
        info!(seed = self.seed, "{} -> {next}", self.phase);
        self.phase = next;
        self.emit(DiscoveryEvent::PhaseChanged(next));
    }

    pub(crate) fn emit(&self, event: DiscoveryEvent) {
        // no subscribers is fine
        let _ = self
            .event_tx
            .send(event)
            .tap_err(|e| debug!("Discovery event not delivered: {e:?}"));
    }
}
