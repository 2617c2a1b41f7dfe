use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::http_client::parse_retry_after;
use super::retry_state::RetryState;
use super::*;
use crate::test_util::{RecordingSleeper, ScriptedClient, fault, ok_json, throttled};

fn transport(client: Arc<ScriptedClient>) -> (ResilientTransport, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let transport = ResilientTransport::new(client).with_sleeper(sleeper.clone());
    (transport, sleeper)
}

async fn fetch(
    transport: &ResilientTransport,
    policy: &RetryPolicy,
) -> Result<serde_json::Value, TransportError> {
    transport
        .fetch_resilient(
            "https://api.example.com/search?q=a b",
            &RequestOptions::default(),
            policy,
            &CancellationToken::new(),
        )
        .await
}

#[tokio::test]
async fn test_retries_throttle_with_growing_backoff() {
    let client = ScriptedClient::new(vec![throttled(), throttled(), ok_json(r#"{"ok":true}"#)]);
    let (transport, sleeper) = transport(client.clone());

    let body = fetch(&transport, &RetryPolicy::default()).await.unwrap();

    assert_eq!(json!({"ok": true}), body);
    let sleeps = sleeper.sleeps();
    assert_eq!(2, sleeps.len());
    assert!(sleeps[1] >= sleeps[0]);
    assert_eq!(
        vec![Duration::from_millis(3000), Duration::from_millis(6000)],
        sleeps
    );
    assert_eq!(3, client.requests().len());
}

#[tokio::test]
async fn test_rate_limit_exhausted() {
    let client = ScriptedClient::new(vec![throttled(), throttled(), throttled()]);
    let (transport, sleeper) = transport(client.clone());
    let policy = RetryPolicy {
        max_retries: 2,
        ..Default::default()
    };

    let res = fetch(&transport, &policy).await;

    assert_eq!(Err(TransportError::RateLimitExceeded { attempts: 3 }), res);
    assert_eq!(2, sleeper.sleeps().len());
    assert_eq!(3, client.requests().len());
}

#[tokio::test]
async fn test_zero_retries_fails_on_first_throttle() {
    let client = ScriptedClient::new(vec![throttled()]);
    let (transport, sleeper) = transport(client);
    let policy = RetryPolicy {
        max_retries: 0,
        ..Default::default()
    };

    let res = fetch(&transport, &policy).await;

    assert_eq!(Err(TransportError::RateLimitExceeded { attempts: 1 }), res);
    assert!(sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_http_error_is_not_retried() {
    let client = ScriptedClient::new(vec![Ok(RawResponse::status(503)), ok_json("{}")]);
    let (transport, sleeper) = transport(client.clone());

    let res = fetch(&transport, &RetryPolicy::default()).await;

    assert_eq!(Err(TransportError::HttpError(503)), res);
    assert!(sleeper.sleeps().is_empty());
    assert_eq!(1, client.requests().len());
}

#[tokio::test]
async fn test_retry_after_hint_overrides_backoff() {
    let hinted = Ok(RawResponse {
        status: 429,
        retry_after: Some(Duration::from_secs(7)),
        body: String::new(),
    });
    let client = ScriptedClient::new(vec![hinted, ok_json("[]")]);
    let (transport, sleeper) = transport(client);

    fetch(&transport, &RetryPolicy::default()).await.unwrap();

    assert_eq!(vec![Duration::from_secs(7)], sleeper.sleeps());
}

#[tokio::test]
async fn test_jitter_stays_within_range() {
    let client = ScriptedClient::new(vec![throttled(), ok_json("{}")]);
    let (transport, sleeper) = transport(client);
    let policy =
        RetryPolicy::default().with_jitter(Duration::from_millis(100), Duration::from_millis(200));

    fetch(&transport, &policy).await.unwrap();

    let wait = sleeper.sleeps()[0];
    assert!(wait >= Duration::from_millis(3100), "{wait:?}");
    assert!(wait <= Duration::from_millis(3200), "{wait:?}");
}

#[tokio::test]
async fn test_network_fault_retries_after_fixed_delay() {
    let client = ScriptedClient::new(vec![fault(true), fault(true), ok_json("{}")]);
    let (transport, sleeper) = transport(client);

    fetch(&transport, &RetryPolicy::default()).await.unwrap();

    assert_eq!(
        vec![Duration::from_millis(1000), Duration::from_millis(1000)],
        sleeper.sleeps()
    );
}

#[tokio::test]
async fn test_network_fault_exhausted() {
    let client = ScriptedClient::new(vec![fault(true), fault(true)]);
    let (transport, _) = transport(client);
    let policy = RetryPolicy {
        max_retries: 1,
        ..Default::default()
    };

    let res = fetch(&transport, &policy).await;

    assert_matches!(res, Err(TransportError::NetworkError(msg)) if msg == "connection refused");
}

#[tokio::test]
async fn test_fatal_fault_is_not_retried() {
    let client = ScriptedClient::new(vec![fault(false), ok_json("{}")]);
    let (transport, sleeper) = transport(client.clone());

    let res = fetch(&transport, &RetryPolicy::default()).await;

    assert_matches!(res, Err(TransportError::NetworkError(_)));
    assert!(sleeper.sleeps().is_empty());
    assert_eq!(1, client.requests().len());
}

#[tokio::test]
async fn test_malformed_body() {
    let client = ScriptedClient::new(vec![ok_json("<html>blocked</html>")]);
    let (transport, _) = transport(client);

    let res = fetch(&transport, &RetryPolicy::default()).await;

    assert_matches!(res, Err(TransportError::MalformedBody(_)));
}

#[tokio::test]
async fn test_proxy_chain_rotates_and_unwraps_envelope() {
    let envelope = json!({ "contents": r#"{"collection":[]}"#, "status": { "http_code": 200 } });
    let client = ScriptedClient::new(vec![throttled(), ok_json(&envelope.to_string())]);
    let (transport, _) = transport(client.clone());
    let policy = RetryPolicy::default().with_proxy_chain(ProxyChain::new(vec![
        ProxyEndpoint::direct("https://direct.example/?").with_header("x-requested-with", "namedrop"),
        ProxyEndpoint::enveloped("https://envelope.example/get?url="),
    ]));

    let body = fetch(&transport, &policy).await.unwrap();

    assert_eq!(json!({ "collection": [] }), body);
    let requests = client.requests();
    assert_eq!(
        "https://direct.example/?https%3A%2F%2Fapi.example.com%2Fsearch%3Fq%3Da%20b",
        requests[0].url
    );
    assert_eq!(
        vec![("x-requested-with".to_owned(), "namedrop".to_owned())],
        requests[0].headers
    );
    assert_eq!(
        "https://envelope.example/get?url=https%3A%2F%2Fapi.example.com%2Fsearch%3Fq%3Da%20b",
        requests[1].url
    );
    assert!(requests[1].headers.is_empty());
}

#[tokio::test]
async fn test_proxy_cursor_wraps_around() {
    let client = ScriptedClient::new(vec![throttled(), throttled(), ok_json("{}")]);
    let (transport, _) = transport(client.clone());
    let policy = RetryPolicy::default().with_proxy_chain(ProxyChain::new(vec![
        ProxyEndpoint::direct("https://a.example/?"),
        ProxyEndpoint::direct("https://b.example/?"),
    ]));

    fetch(&transport, &policy).await.unwrap();

    let prefixes: Vec<_> = client
        .requests()
        .into_iter()
        .map(|r| r.url.split('?').next().unwrap().to_owned())
        .collect();
    assert_eq!(
        vec!["https://a.example/", "https://b.example/", "https://a.example/"],
        prefixes
    );
}

#[tokio::test]
async fn test_envelope_status_is_treated_as_target_status() {
    let throttled_envelope = json!({ "contents": null, "status": { "http_code": 429 } });
    let client = ScriptedClient::new(vec![
        ok_json(&throttled_envelope.to_string()),
        ok_json(&json!({ "contents": "{\"a\":1}" }).to_string()),
    ]);
    let (transport, sleeper) = transport(client);
    let policy = RetryPolicy::default().with_proxy_chain(ProxyChain::new(vec![
        ProxyEndpoint::enveloped("https://envelope.example/get?url="),
    ]));

    let body = fetch(&transport, &policy).await.unwrap();

    assert_eq!(json!({ "a": 1 }), body);
    assert_eq!(1, sleeper.sleeps().len());
}

#[tokio::test]
async fn test_invalid_envelope() {
    let client = ScriptedClient::new(vec![ok_json(r#"{"collection":[]}"#)]);
    let (transport, _) = transport(client);
    let policy = RetryPolicy::default().with_proxy_chain(ProxyChain::new(vec![
        ProxyEndpoint::enveloped("https://envelope.example/get?url="),
    ]));

    let res = fetch(&transport, &policy).await;

    assert_matches!(res, Err(TransportError::MalformedBody(_)));
}

#[tokio::test]
async fn test_cancelled_before_request() {
    let client = ScriptedClient::new(vec![ok_json("{}")]);
    let (transport, _) = transport(client.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let res = transport
        .fetch_resilient(
            "https://api.example.com",
            &RequestOptions::default(),
            &RetryPolicy::default(),
            &cancel,
        )
        .await;

    assert_eq!(Err(TransportError::Cancelled), res);
    assert!(client.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_backoff_sleep() {
    let client = ScriptedClient::new(vec![throttled(), ok_json("{}")]);
    let transport = ResilientTransport::new(client.clone());
    let cancel = CancellationToken::new();
    let cancel_ = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel_.cancel();
    });

    let res = transport
        .fetch_resilient(
            "https://api.example.com",
            &RequestOptions::default(),
            &RetryPolicy::default(),
            &cancel,
        )
        .await;

    assert_eq!(Err(TransportError::Cancelled), res);
    assert_eq!(1, client.requests().len());
}

#[tokio::test(start_paused = true)]
async fn test_total_timeout_bounds_retries() {
    let client = ScriptedClient::new(vec![throttled(), throttled(), ok_json("{}")]);
    let transport = ResilientTransport::new(client.clone());
    let policy = RetryPolicy {
        total_timeout: Duration::from_secs(5),
        ..Default::default()
    };

    let res = fetch(&transport, &policy).await;

    // 3s wait fits the ceiling, the following 6s wait does not
    assert_eq!(Err(TransportError::RateLimitExceeded { attempts: 2 }), res);
    assert_eq!(2, client.requests().len());
}

#[test]
fn test_proxy_chain_from_json() {
    let chain = ProxyChain::from_json(
        r#"[
            {"kind": "direct", "prefix": "https://corsproxy.io/?"},
            {"kind": "enveloped", "prefix": "https://api.allorigins.win/get?url=",
             "headers": [{"name": "origin", "value": "https://namedrop.app"}]}
        ]"#,
    )
    .unwrap();

    assert_eq!(
        ProxyChain::new(vec![
            ProxyEndpoint::direct("https://corsproxy.io/?"),
            ProxyEndpoint::enveloped("https://api.allorigins.win/get?url=")
                .with_header("origin", "https://namedrop.app"),
        ]),
        chain
    );
}

#[test]
fn test_proxy_chain_rejects_unknown_kind() {
    assert_matches!(
        ProxyChain::from_json(r#"[{"kind": "socks", "prefix": "x"}]"#),
        Err(crate::settings::SettingsError::InvalidProxyChain(_))
    );
}

#[test]
fn test_policy_validation() {
    assert!(RetryPolicy::default().validate().is_ok());
    let bad_multiplier = RetryPolicy {
        backoff_multiplier: 1.0,
        ..Default::default()
    };
    assert!(bad_multiplier.validate().is_err());
    let inverted_jitter =
        RetryPolicy::default().with_jitter(Duration::from_millis(5), Duration::from_millis(1));
    assert!(inverted_jitter.validate().is_err());
}

#[test]
fn test_parse_retry_after() {
    assert_eq!(Some(Duration::from_secs(12)), parse_retry_after(" 12 "));
    assert_eq!(None, parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"));
    assert_eq!(
        Some(Duration::from_secs(24 * 60 * 60)),
        parse_retry_after("18446744073709551615")
    );
}

#[rstest]
#[case(parse_retry_after("18446744073709551615"))]
#[case(Some(Duration::MAX))]
#[tokio::test]
async fn test_oversized_retry_after_exhausts_rate_limit(#[case] retry_after: Option<Duration>) {
    let hinted = Ok(RawResponse {
        status: 429,
        retry_after,
        body: String::new(),
    });
    let client = ScriptedClient::new(vec![hinted, ok_json("{}")]);
    let (transport, sleeper) = transport(client.clone());

    let res = fetch(&transport, &RetryPolicy::default()).await;

    assert_eq!(Err(TransportError::RateLimitExceeded { attempts: 1 }), res);
    assert!(sleeper.sleeps().is_empty());
    assert_eq!(1, client.requests().len());
}

#[tokio::test]
async fn test_many_hinted_throttles_do_not_overflow_backoff() {
    let zero_hint = || {
        Ok(RawResponse {
            status: 429,
            retry_after: Some(Duration::ZERO),
            body: String::new(),
        })
    };
    let mut script: Vec<_> = (0..80).map(|_| zero_hint()).collect();
    script.push(ok_json(r#"{"ok":true}"#));
    let client = ScriptedClient::new(script);
    let (transport, sleeper) = transport(client.clone());
    let policy = RetryPolicy {
        max_retries: 80,
        ..Default::default()
    };

    let body = fetch(&transport, &policy).await.unwrap();

    assert_eq!(json!({"ok": true}), body);
    assert_eq!(vec![Duration::ZERO; 80], sleeper.sleeps());
    assert_eq!(81, client.requests().len());
}

#[test]
fn test_backoff_growth_is_capped_at_total_timeout() {
    let policy = RetryPolicy {
        max_retries: 200,
        ..Default::default()
    };
    let mut state = RetryState::new(&policy);
    for _ in 0..200 {
        state.after_throttle(&policy);
    }

    assert_eq!(policy.total_timeout, state.backoff);
    assert_eq!(policy.total_timeout, state.throttle_wait(None, &policy));
}

#[test]
fn test_policy_rejects_unbounded_total_timeout() {
    let policy = RetryPolicy {
        total_timeout: Duration::MAX,
        ..Default::default()
    };
    assert_matches!(
        policy.validate(),
        Err(crate::settings::SettingsError::InvalidRetryPolicy(_))
    );
}

#[tokio::test]
async fn test_unbounded_total_timeout_is_clamped() {
    let client = ScriptedClient::new(vec![throttled(), ok_json("{}")]);
    let (transport, sleeper) = transport(client);
    let policy = RetryPolicy {
        total_timeout: Duration::MAX,
        ..Default::default()
    };

    fetch(&transport, &policy).await.unwrap();

    assert_eq!(vec![Duration::from_millis(3000)], sleeper.sleeps());
}
