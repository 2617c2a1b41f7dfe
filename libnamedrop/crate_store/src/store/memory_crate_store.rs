use std::sync::{Mutex, PoisonError};

use eyre::Result;

use super::CrateStore;
use crate::pinned_track::PinnedTrack;

#[derive(Default)]
pub struct MemoryCrateStore {
    tracks: Mutex<Vec<PinnedTrack>>,
}

impl MemoryCrateStore {
    pub fn new_boxed() -> Box<dyn CrateStore + Send + Sync> {
        Box::new(Self::default())
    }
}

impl CrateStore for MemoryCrateStore {
    fn load(&self) -> Result<Vec<PinnedTrack>> {
        Ok(self
            .tracks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, tracks: &[PinnedTrack]) -> Result<()> {
        *self.tracks.lock().unwrap_or_else(PoisonError::into_inner) = tracks.to_vec();
        Ok(())
    }
}
