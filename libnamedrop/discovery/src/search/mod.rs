mod candidate_search;
mod track_mapping;

pub use candidate_search::*;
