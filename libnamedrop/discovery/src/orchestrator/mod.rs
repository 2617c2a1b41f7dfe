mod discovery_orchestrator;
mod orchestrator_error;
mod phase_tracker;

pub use discovery_orchestrator::*;
pub use orchestrator_error::*;
