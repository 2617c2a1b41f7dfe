pub mod candidate_track;
pub mod discovery_event;
pub mod discovery_report;
pub mod related_artist;
pub mod seed_query;
