//! Result of a retrieval attempt, returned rather than raised.

use crate::error::ScraperError;
use crate::retry::FailureClass;

/// How a successful response body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAs {
    RawText,
    Json,
}

/// A decoded response body, tagged with its content kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(serde_json::Value),
}

impl ParseAs {
    /// Decodes `body` per this mode.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Deserialize`] when JSON was requested and the
    /// body is not valid JSON.
    pub fn decode(self, url: &str, body: String) -> Result<Payload, ScraperError> {
        match self {
            Self::RawText => Ok(Payload::Text(body)),
            Self::Json => serde_json::from_str(&body)
                .map(Payload::Json)
                .map_err(|e| ScraperError::Deserialize {
                    context: format!("response body from {url}"),
                    source: e,
                }),
        }
    }
}

/// Tagged result of one request.
///
/// A single attempt produces `Success` or `RetryableFailure`; the retry loop
/// in [`crate::client::Session::fetch`] turns the last `RetryableFailure` into a
/// `FatalFailure` once the attempt budget is spent.
#[derive(Debug)]
pub enum RequestOutcome {
    Success {
        payload: Payload,
    },
    RetryableFailure {
        class: FailureClass,
        reason: ScraperError,
        /// 0-based attempt that produced this failure.
        attempt: u32,
    },
    FatalFailure {
        reason: ScraperError,
    },
}

impl RequestOutcome {
    pub(crate) fn retryable(reason: ScraperError, attempt: u32) -> Self {
        Self::RetryableFailure {
            class: FailureClass::of(&reason),
            reason,
            attempt,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Collapses the outcome into a `Result`, treating any failure as final.
    ///
    /// # Errors
    ///
    /// Returns the failure reason for `RetryableFailure` and `FatalFailure`.
    pub fn into_result(self) -> Result<Payload, ScraperError> {
        match self {
            Self::Success { payload } => Ok(payload),
            Self::RetryableFailure { reason, .. } | Self::FatalFailure { reason } => Err(reason),
        }
    }
}
