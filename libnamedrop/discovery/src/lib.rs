pub mod curation;
pub mod dto;
pub mod orchestrator;
pub mod resolver;
pub mod search;
pub mod settings;
pub mod transport;
mod util;

#[cfg(test)]
#[path = "./test_util.rs"]
pub(crate) mod test_util;
