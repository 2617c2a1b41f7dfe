use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::Level;

use crate::dto::candidate_track::{CandidateTrack, Tempo};
use crate::transport::{
    FetchFault, HttpClient, OutboundRequest, RawResponse, Sleeper, TransportError,
};

#[ctor::ctor]
fn init() {
    tracing_subscriber::fmt()
        .pretty()
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init()
        .unwrap_or_default();
}

/// Replays canned responses in order and remembers every request it saw.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    script: Mutex<VecDeque<Result<RawResponse, FetchFault>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new(script: Vec<Result<RawResponse, FetchFault>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(vec![]),
        })
    }

    pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn get(&self, request: &OutboundRequest) -> Result<RawResponse, FetchFault> {
        self.requests.lock().unwrap().push(request.clone());
        self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(FetchFault {
                retryable: false,
                message: "script exhausted".to_owned(),
            })
        })
    }
}

/// Records requested sleep durations without waiting.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(
        &self,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        self.sleeps.lock().unwrap().push(duration);
        Ok(())
    }
}

pub(crate) fn throttled() -> Result<RawResponse, FetchFault> {
    Ok(RawResponse::status(429))
}

pub(crate) fn ok_json(body: &str) -> Result<RawResponse, FetchFault> {
    Ok(RawResponse::ok(body))
}

pub(crate) fn fault(retryable: bool) -> Result<RawResponse, FetchFault> {
    Err(FetchFault {
        retryable,
        message: "connection refused".to_owned(),
    })
}

pub(crate) fn track(artist: &str, title: &str, plays: u64, url: &str) -> CandidateTrack {
    CandidateTrack {
        artist: artist.to_owned(),
        title: title.to_owned(),
        play_count: plays,
        url: url.to_owned(),
        genre_tag: "Bass".to_owned(),
        tempo: Tempo::Unknown,
    }
}
