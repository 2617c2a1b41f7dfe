use std::sync::{Mutex, PoisonError};

use eyre::Result;
use libnamedrop_discovery::dto::candidate_track::{CandidateTrack, TrackId};
use libnamedrop_discovery::dto::discovery_report::TrackIndex;
use tap::TapFallible;
use tracing::{info, warn};

use crate::pinned_track::PinnedTrack;
use crate::store::CrateStore;

/// User intent coming from a rendered result list. Only the id travels with the action; the
/// track itself is looked up in the [`TrackIndex`] of the report being shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinAction {
    Pin(TrackId),
    Unpin(TrackId),
    Toggle(TrackId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned,
    Unpinned,
    Unchanged,
}

/// In-memory view of the crate, written through to its [`CrateStore`] on every change.
pub struct PinBoard {
    store: Box<dyn CrateStore + Send + Sync>,
    pinned: Mutex<Vec<PinnedTrack>>,
}

impl PinBoard {
    pub fn open(store: Box<dyn CrateStore + Send + Sync>) -> Result<Self> {
        let mut pinned: Vec<PinnedTrack> = Vec::new();
        for track in store.load()? {
            if !track.track().has_url() || pinned.contains(&track) {
                continue;
            }
            pinned.push(track);
        }
        info!(count = pinned.len(), "Loaded pinned crate");

        Ok(Self {
            store,
            pinned: Mutex::new(pinned),
        })
    }

    pub fn pinned(&self) -> Vec<PinnedTrack> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_pinned(&self, id: &TrackId) -> bool {
        self.lock().iter().any(|t| t.id() == *id)
    }

    /// Returns `false` when the track was already pinned or has no url to key it by.
    pub fn pin(&self, track: CandidateTrack) -> Result<bool> {
        let mut pinned = self.lock();
        self.pin_locked(&mut pinned, track)
    }

    pub fn unpin(&self, id: &TrackId) -> Result<bool> {
        let mut pinned = self.lock();
        self.unpin_locked(&mut pinned, id)
    }

    pub fn toggle(&self, track: CandidateTrack) -> Result<PinOutcome> {
        let mut pinned = self.lock();
        let id = track.id();
        if pinned.iter().any(|t| t.id() == id) {
            return Ok(outcome(
                self.unpin_locked(&mut pinned, &id)?,
                PinOutcome::Unpinned,
            ));
        }
        Ok(outcome(
            self.pin_locked(&mut pinned, track)?,
            PinOutcome::Pinned,
        ))
    }

    pub fn handle(&self, action: PinAction, index: &TrackIndex) -> Result<PinOutcome> {
        let mut pinned = self.lock();
        let (id, unpin) = match action {
            PinAction::Pin(id) => (id, false),
            PinAction::Unpin(id) => (id, true),
            PinAction::Toggle(id) => {
                let is_pinned = pinned.iter().any(|t| t.id() == id);
                (id, is_pinned)
            }
        };

        if unpin {
            return Ok(outcome(
                self.unpin_locked(&mut pinned, &id)?,
                PinOutcome::Unpinned,
            ));
        }
        match index.get(&id) {
            Some(track) => Ok(outcome(
                self.pin_locked(&mut pinned, track.clone())?,
                PinOutcome::Pinned,
            )),
            None => {
                warn!(%id, "Pin requested for a track that is not in the current results");
                Ok(PinOutcome::Unchanged)
            }
        }
    }

    fn pin_locked(&self, pinned: &mut Vec<PinnedTrack>, track: CandidateTrack) -> Result<bool> {
        if !track.has_url() {
            warn!(title = %track.title, "Ignoring pin for a track without a url");
            return Ok(false);
        }

        let track = PinnedTrack::from(track);
        if pinned.contains(&track) {
            return Ok(false);
        }

        let mut next = pinned.clone();
        next.push(track);
        self.commit(pinned, next)?;
        Ok(true)
    }

    fn unpin_locked(&self, pinned: &mut Vec<PinnedTrack>, id: &TrackId) -> Result<bool> {
        if !pinned.iter().any(|t| t.id() == *id) {
            return Ok(false);
        }

        let next = pinned.iter().filter(|t| t.id() != *id).cloned().collect();
        self.commit(pinned, next)?;
        Ok(true)
    }

    fn commit(&self, pinned: &mut Vec<PinnedTrack>, next: Vec<PinnedTrack>) -> Result<()> {
        self.store
            .save(&next)
            .tap_err(|e| warn!("Error saving pinned crate: {e:?}"))?;
        *pinned = next;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PinnedTrack>> {
        self.pinned.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn outcome(changed: bool, when_changed: PinOutcome) -> PinOutcome {
    if changed {
        when_changed
    } else {
        PinOutcome::Unchanged
    }
}

#[cfg(test)]
#[path = "./pin_board_test.rs"]
mod pin_board_test;
