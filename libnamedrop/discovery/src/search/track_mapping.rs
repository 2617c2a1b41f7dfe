use serde_json::Value;
use tracing::warn;

use crate::dto::candidate_track::{CandidateTrack, Tempo};
use crate::dto::related_artist::RelatedArtist;

const TITLE_KEYS: [&str; 2] = ["title", "name"];
const COUNT_KEYS: [&str; 2] = ["playback_count", "listeners"];
const URL_KEYS: [&str; 2] = ["permalink_url", "url"];

/// Pulls the raw track list out of either a `collection` payload or a
/// `results.trackmatches.track` payload.
pub(crate) fn extract_items(body: Value) -> Vec<Value> {
    let items = match body {
        Value::Object(mut map) => match map.remove("collection") {
            Some(collection) => Some(collection),
            None => map
                .remove("results")
                .and_then(|mut r| r.get_mut("trackmatches").map(Value::take))
                .and_then(|mut m| m.get_mut("track").map(Value::take)),
        },
        _ => None,
    };

    match items {
        Some(Value::Array(items)) => items,
        Some(item @ Value::Object(_)) => vec![item],
        Some(Value::Null) | None => vec![],
        Some(other) => {
            warn!("Ignoring unexpected search payload: {other}");
            vec![]
        }
    }
}

pub(crate) fn map_track(
    item: &Value,
    artist: &RelatedArtist,
    fallback_genre: &str,
) -> Option<CandidateTrack> {
    let title = first_of(item, &TITLE_KEYS).and_then(as_text)?;
    let artist = if artist.name.trim().is_empty() {
        raw_artist(item)?
    } else {
        artist.name.clone()
    };

    Some(CandidateTrack {
        artist,
        title,
        play_count: first_of(item, &COUNT_KEYS).and_then(as_count).unwrap_or(0),
        url: first_of(item, &URL_KEYS).and_then(as_text).unwrap_or_default(),
        genre_tag: item
            .get("genre")
            .and_then(as_text)
            .unwrap_or_else(|| fallback_genre.to_owned()),
        tempo: Tempo::from_hint(item.get("bpm").and_then(as_float)),
    })
}

fn raw_artist(item: &Value) -> Option<String> {
    item.get("artist")
        .and_then(as_text)
        .or_else(|| item.pointer("/user/username").and_then(as_text))
}

fn first_of<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| item.get(*key).filter(|v| !v.is_null()))
}

fn as_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
