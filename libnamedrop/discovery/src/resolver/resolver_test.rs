use std::sync::Arc;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::dto::related_artist::RelatedArtist;
use crate::dto::seed_query::SeedQuery;
use crate::test_util::{RecordingSleeper, ScriptedClient, ok_json, throttled};
use crate::transport::{RawResponse, ResilientTransport, RetryPolicy, TransportError};

fn resolver(client: Arc<ScriptedClient>) -> SimilarityResolver {
    let transport =
        ResilientTransport::new(client).with_sleeper(Arc::new(RecordingSleeper::default()));
    SimilarityResolver::new(
        transport,
        "https://ws.audioscrobbler.com/2.0/",
        "key",
        RetryPolicy::default(),
    )
}

fn seed(name: &str) -> SeedQuery {
    SeedQuery::parse(name).unwrap()
}

#[tokio::test]
async fn test_resolve_similar() {
    let body = json!({
        "similarartists": {
            "artist": [
                { "name": "Rezz", "match": "1" },
                { "name": "ARIZONA", "match": "0.8" }
            ],
            "@attr": { "artist": "Flume" }
        }
    });
    let client = ScriptedClient::new(vec![ok_json(&body.to_string())]);

    let artists = resolver(client.clone())
        .resolve_similar(&seed("Flume"), 5, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        vec![RelatedArtist::new("Rezz"), RelatedArtist::new("ARIZONA")],
        artists
    );
    assert_eq!(
        "https://ws.audioscrobbler.com/2.0/?method=artist.getsimilar&artist=Flume&api_key=key&format=json&limit=5",
        client.requests()[0].url
    );
}

#[tokio::test]
async fn test_resolve_caps_at_limit() {
    let body = json!({
        "similarartists": { "artist": [{ "name": "a" }, { "name": "b" }, { "name": "c" }] }
    });
    let client = ScriptedClient::new(vec![ok_json(&body.to_string())]);

    let artists = resolver(client)
        .resolve_similar(&seed("x"), 2, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(2, artists.len());
}

#[tokio::test]
async fn test_resolve_single_object() {
    let body = json!({ "similarartists": { "artist": { "name": "Only One" } } });
    let client = ScriptedClient::new(vec![ok_json(&body.to_string())]);

    let artists = resolver(client)
        .resolve_similar(&seed("x"), 5, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(vec![RelatedArtist::new("Only One")], artists);
}

#[tokio::test]
async fn test_unknown_artist_not_found() {
    let body = json!({ "error": 6, "message": "The artist you supplied could not be found" });
    let client = ScriptedClient::new(vec![ok_json(&body.to_string())]);

    let res = resolver(client)
        .resolve_similar(&seed("asdfghjkl"), 5, &CancellationToken::new())
        .await;

    assert_eq!(Err(ResolverError::NotFound("asdfghjkl".to_owned())), res);
}

#[tokio::test]
async fn test_empty_artist_list_not_found() {
    let body = json!({ "similarartists": { "artist": [] } });
    let client = ScriptedClient::new(vec![ok_json(&body.to_string())]);

    let res = resolver(client)
        .resolve_similar(&seed("x"), 5, &CancellationToken::new())
        .await;

    assert_matches!(res, Err(ResolverError::NotFound(_)));
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let client = ScriptedClient::new(vec![throttled(), Ok(RawResponse::status(500))]);

    let res = resolver(client)
        .resolve_similar(&seed("x"), 5, &CancellationToken::new())
        .await;

    assert_eq!(
        Err(ResolverError::Transport(TransportError::HttpError(500))),
        res
    );
}

#[tokio::test]
async fn test_seed_is_encoded() {
    let client = ScriptedClient::new(vec![ok_json("{}")]);

    let _ = resolver(client.clone())
        .resolve_similar(&seed("  Sigur Rós & co "), 5, &CancellationToken::new())
        .await;

    assert!(
        client.requests()[0]
            .url
            .contains("artist=Sigur%20R%C3%B3s%20%26%20co&")
    );
}
