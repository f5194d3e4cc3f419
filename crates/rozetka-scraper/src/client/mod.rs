//! Resilient request client: paced, classified, retried GETs over one session.

mod headers;
mod transport;

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::HeaderMap;
use tracing::{Instrument, Span};

use crate::error::ScraperError;
use crate::outcome::{ParseAs, RequestOutcome};
use crate::retry::RetrievalPolicy;

pub use transport::{HttpTransport, RawResponse, Transport, TransportSettings};

use headers::{baseline_headers, is_challenge, request_headers, short_url};

/// A scoped retrieval session.
///
/// Owns the transport (and with it the connection pool and cookie jar) for
/// the duration of a harvest run. Opening logs once; dropping the session
/// logs once and releases the transport on every exit path.
///
/// Requests are strictly sequential: every call to [`Session::fetch`] sleeps
/// a pacing jitter before each attempt and a settle jitter after a success.
pub struct Session<T: Transport = HttpTransport> {
    transport: T,
    policy: RetrievalPolicy,
    baseline: HeaderMap,
    requests: AtomicU64,
    span: Span,
}

impl Session<HttpTransport> {
    /// Builds an [`HttpTransport`] from `settings` and opens a session on it.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the HTTP transport cannot be constructed.
    pub fn connect(
        settings: &TransportSettings,
        policy: RetrievalPolicy,
    ) -> Result<Self, ScraperError> {
        let transport = HttpTransport::new(settings)?;
        Ok(Self::open(transport, policy, &settings.user_agent))
    }
}

impl<T: Transport> Session<T> {
    #[must_use]
    pub fn open(transport: T, policy: RetrievalPolicy, user_agent: &str) -> Self {
        let span = tracing::info_span!("session");
        span.in_scope(|| {
            tracing::info!(
                max_attempts = policy.max_attempts,
                pacing_min_secs = policy.pacing.min_secs,
                pacing_max_secs = policy.pacing.max_secs,
                "session opened"
            );
        });
        Self {
            transport,
            baseline: baseline_headers(user_agent),
            policy,
            requests: AtomicU64::new(0),
            span,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &RetrievalPolicy {
        &self.policy
    }

    /// Number of attempts sent through the transport so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Fetches `url`, retrying retryable failures up to `max_attempts` total
    /// attempts (at least one is always made).
    ///
    /// Never returns `RetryableFailure`: the last retryable failure becomes a
    /// `FatalFailure` wrapping [`ScraperError::ExhaustedRetries`].
    pub async fn fetch(&self, url: &str, parse_as: ParseAs, max_attempts: u32) -> RequestOutcome {
        self.fetch_with_retries(url, parse_as, max_attempts.max(1))
            .instrument(self.span.clone())
            .await
    }

    async fn fetch_with_retries(
        &self,
        url: &str,
        parse_as: ParseAs,
        max_attempts: u32,
    ) -> RequestOutcome {
        let mut attempt = 0u32;
        loop {
            match self.attempt(url, parse_as, attempt).await {
                RequestOutcome::RetryableFailure { class, reason, .. } => {
                    if attempt + 1 >= max_attempts {
                        tracing::error!(
                            url,
                            attempts = max_attempts,
                            error = %reason,
                            "request failed after all attempts"
                        );
                        return RequestOutcome::FatalFailure {
                            reason: ScraperError::ExhaustedRetries {
                                url: url.to_owned(),
                                attempts: max_attempts,
                                last_error: Box::new(reason),
                            },
                        };
                    }
                    let delay = self.policy.backoff(class).delay(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        %class,
                        delay_secs = delay.as_secs_f64(),
                        error = %reason,
                        "retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// One attempt: pace, send, classify, settle, decode.
    async fn attempt(&self, url: &str, parse_as: ParseAs, attempt: u32) -> RequestOutcome {
        tokio::time::sleep(self.policy.pacing.sample()).await;

        let headers = request_headers(&self.baseline, url);
        let request = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        let short = short_url(url);
        tracing::info!(request, "➤ [{}] {short}", attempt + 1);

        let response = match self.transport.get(url, headers).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "⚠ request error {short}");
                return RequestOutcome::retryable(e, attempt);
            }
        };

        if is_challenge(&response) {
            tracing::warn!("⚠ {} challenge {short}", response.status);
            return RequestOutcome::retryable(
                ScraperError::ChallengeUnresolved {
                    url: url.to_owned(),
                },
                attempt,
            );
        }

        let status = response.status;
        if !(200..300).contains(&status) {
            tracing::warn!("⚠ {status} {short}");
            return RequestOutcome::retryable(status_error(status, url), attempt);
        }
        tracing::info!("✓ {status} {short}");

        tokio::time::sleep(self.policy.settle.sample()).await;

        match parse_as.decode(url, response.body) {
            Ok(payload) => RequestOutcome::Success { payload },
            Err(e) => {
                tracing::warn!(error = %e, "⚠ undecodable body {short}");
                RequestOutcome::retryable(e, attempt)
            }
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        tracing::info!(requests = self.request_count(), "session closed");
    }
}

fn status_error(status: u16, url: &str) -> ScraperError {
    let url = url.to_owned();
    match status {
        403 => ScraperError::BlockedByAntiBot { url },
        429 => ScraperError::RateLimited { url },
        _ => ScraperError::UnexpectedStatus { status, url },
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
