//! Scripted in-memory transport shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use reqwest::header::HeaderMap;
use tokio::time::{Duration, Instant};

use rozetka_scraper::{JitterRange, RawResponse, RetrievalPolicy, ScraperError, Session, Transport};

pub const UA: &str = "rozetka-test/0.1";

enum Scripted {
    Response(RawResponse),
    Error(String),
}

/// One request seen by the transport.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub headers: HeaderMap,
    pub at: Instant,
}

#[derive(Default)]
struct Inner {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Serves queued responses per exact URL; unscripted URLs get a 404.
///
/// Cloning shares the script and the call log, so a test can keep a handle
/// after moving the transport into a session.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Inner>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn enqueue(&self, url: &str, item: Scripted) {
        self.inner
            .scripts
            .lock()
            .unwrap()
            .entry(url.to_owned())
            .or_default()
            .push_back(item);
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) -> &Self {
        self.enqueue(url, Scripted::Response(RawResponse::new(status, body)));
        self
    }

    pub fn respond_json(&self, url: &str, body: &serde_json::Value) -> &Self {
        self.respond(url, 200, &body.to_string())
    }

    pub fn respond_raw(&self, url: &str, response: RawResponse) -> &Self {
        self.enqueue(url, Scripted::Response(response));
        self
    }

    pub fn fail(&self, url: &str, reason: &str) -> &Self {
        self.enqueue(url, Scripted::Error(reason.to_owned()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn call_urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }

    /// Time between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        self.calls()
            .windows(2)
            .map(|pair| pair[1].at.duration_since(pair[0].at))
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<RawResponse, ScraperError> {
        self.inner.calls.lock().unwrap().push(RecordedCall {
            url: url.to_owned(),
            headers,
            at: Instant::now(),
        });
        let next = self
            .inner
            .scripts
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Error(reason)) => Err(ScraperError::Transport {
                url: url.to_owned(),
                reason,
            }),
            None => Ok(RawResponse::new(404, "unscripted")),
        }
    }
}

/// Default backoff curves with pacing and settle sleeps removed.
pub fn unpaced_policy(max_attempts: u32) -> RetrievalPolicy {
    RetrievalPolicy::default()
        .with_max_attempts(max_attempts)
        .with_pacing(JitterRange::ZERO)
        .with_settle(JitterRange::ZERO)
}

pub fn session(transport: &ScriptedTransport, max_attempts: u32) -> Session<ScriptedTransport> {
    Session::open(transport.clone(), unpaced_policy(max_attempts), UA)
}

/// Asserts `actual` lies in `[lo, hi]` seconds, allowing a few ms of slack.
pub fn assert_between(actual: Duration, lo: f64, hi: f64) {
    let secs = actual.as_secs_f64();
    assert!(
        secs >= lo - 0.005 && secs <= hi + 0.005,
        "expected wait in [{lo}, {hi}] s, got {secs} s"
    );
}
