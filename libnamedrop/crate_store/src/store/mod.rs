mod crate_store_error;
mod file_crate_store;
mod memory_crate_store;

pub use crate_store_error::*;
use eyre::Result;
pub use file_crate_store::*;
pub use memory_crate_store::*;

use crate::pinned_track::PinnedTrack;

/// Durable home of the listener's pinned tracks.
pub trait CrateStore {
    fn load(&self) -> Result<Vec<PinnedTrack>>;
    fn save(&self, tracks: &[PinnedTrack]) -> Result<()>;
}
