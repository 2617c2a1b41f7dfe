use libnamedrop_discovery::dto::candidate_track::{CandidateTrack, Tempo};
use tracing::Level;

#[ctor::ctor]
fn init() {
    tracing_subscriber::fmt()
        .pretty()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init()
        .unwrap_or_default();
}

pub(crate) fn track(artist: &str, title: &str, url: &str) -> CandidateTrack {
    CandidateTrack {
        artist: artist.to_owned(),
        title: title.to_owned(),
        play_count: 1200,
        url: url.to_owned(),
        genre_tag: "Bass".to_owned(),
        tempo: Tempo::Unknown,
    }
}
