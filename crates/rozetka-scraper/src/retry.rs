//! Retrieval policy: pacing jitter and per-failure-class backoff curves.
//!
//! Every failed attempt is assigned a [`FailureClass`]. Each class has its own
//! [`BackoffCurve`] because a 403 block and a 429 throttle recover on very
//! different time scales, while challenge and transport failures only need a
//! flat randomized pause.
//!
//! # Default schedule (`attempt` is 0-based)
//!
//! | Class | Wait before next attempt |
//! |---------------------|-----------------------------------|
//! | BlockedByAntiBot    | `min(3^attempt + U(2, 5), 60)` s  |
//! | RateLimited         | `min(4^attempt + U(5, 10), 120)` s |
//! | ChallengeUnresolved | `U(5, 10)` s                      |
//! | TransportOrParse    | `U(3, 6)` s                       |

use std::time::Duration;

use rand::Rng;

use crate::error::ScraperError;

/// Coarse failure category that selects a backoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// HTTP 403.
    BlockedByAntiBot,
    /// HTTP 429.
    RateLimited,
    /// The interstitial bot challenge could not be passed.
    ChallengeUnresolved,
    /// Network failure, unexpected status, or an undecodable body.
    TransportOrParse,
}

impl FailureClass {
    /// Classifies an attempt-level error.
    #[must_use]
    pub fn of(err: &ScraperError) -> Self {
        match err {
            ScraperError::BlockedByAntiBot { .. } => Self::BlockedByAntiBot,
            ScraperError::RateLimited { .. } => Self::RateLimited,
            ScraperError::ChallengeUnresolved { .. } => Self::ChallengeUnresolved,
            _ => Self::TransportOrParse,
        }
    }
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlockedByAntiBot => write!(f, "blocked"),
            Self::RateLimited => write!(f, "rate-limited"),
            Self::ChallengeUnresolved => write!(f, "challenge"),
            Self::TransportOrParse => write!(f, "transport"),
        }
    }
}

/// Uniform random delay between two bounds, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl JitterRange {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Builds a range from millisecond bounds, as stored in configuration.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(min_ms as f64 / 1000.0, max_ms as f64 / 1000.0)
    }

    /// Draws one value in seconds.
    #[must_use]
    pub fn sample_secs(&self) -> f64 {
        if self.max_secs <= self.min_secs {
            return self.min_secs.max(0.0);
        }
        rand::rng().random_range(self.min_secs..=self.max_secs)
    }

    #[must_use]
    pub fn sample(&self) -> Duration {
        secs_to_duration(self.sample_secs())
    }
}

/// `min(growth^attempt + jitter, cap)`; a flat curve has no growth term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffCurve {
    pub growth: Option<f64>,
    pub jitter: JitterRange,
    pub cap_secs: f64,
}

impl BackoffCurve {
    #[must_use]
    pub const fn exponential(growth: f64, jitter: JitterRange, cap_secs: f64) -> Self {
        Self {
            growth: Some(growth),
            jitter,
            cap_secs,
        }
    }

    #[must_use]
    pub const fn flat(jitter: JitterRange) -> Self {
        Self {
            growth: None,
            jitter,
            cap_secs: f64::INFINITY,
        }
    }

    /// Wait before the attempt following `attempt` (0-based), with fresh jitter.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.delay_with_jitter(attempt, self.jitter.sample_secs())
    }

    /// Deterministic form of [`Self::delay`] for a given jitter draw.
    #[must_use]
    pub fn delay_with_jitter(&self, attempt: u32, jitter_secs: f64) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let growth = self.growth.map_or(0.0, |g| g.powi(exponent));
        secs_to_duration((growth + jitter_secs).min(self.cap_secs))
    }

    /// Smallest and largest wait this curve can produce after `attempt`.
    #[must_use]
    pub fn bounds(&self, attempt: u32) -> (Duration, Duration) {
        (
            self.delay_with_jitter(attempt, self.jitter.min_secs),
            self.delay_with_jitter(attempt, self.jitter.max_secs),
        )
    }
}

/// Immutable retry and pacing configuration for one client session.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Sleep before every attempt.
    pub pacing: JitterRange,
    /// Extra sleep after every successful response.
    pub settle: JitterRange,
    pub blocked: BackoffCurve,
    pub rate_limited: BackoffCurve,
    pub challenge: BackoffCurve,
    pub transport: BackoffCurve,
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            pacing: JitterRange::new(0.3, 0.8),
            settle: JitterRange::new(0.1, 0.3),
            blocked: BackoffCurve::exponential(3.0, JitterRange::new(2.0, 5.0), 60.0),
            rate_limited: BackoffCurve::exponential(4.0, JitterRange::new(5.0, 10.0), 120.0),
            challenge: BackoffCurve::flat(JitterRange::new(5.0, 10.0)),
            transport: BackoffCurve::flat(JitterRange::new(3.0, 6.0)),
        }
    }
}

impl RetrievalPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: JitterRange) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_settle(mut self, settle: JitterRange) -> Self {
        self.settle = settle;
        self
    }

    #[must_use]
    pub fn backoff(&self, class: FailureClass) -> &BackoffCurve {
        match class {
            FailureClass::BlockedByAntiBot => &self.blocked,
            FailureClass::RateLimited => &self.rate_limited,
            FailureClass::ChallengeUnresolved => &self.challenge,
            FailureClass::TransportOrParse => &self.transport,
        }
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_curve_grows_by_powers_of_three() {
        let policy = RetrievalPolicy::default();
        let curve = policy.backoff(FailureClass::BlockedByAntiBot);
        assert_eq!(curve.delay_with_jitter(0, 2.0), Duration::from_secs(3));
        assert_eq!(curve.delay_with_jitter(1, 2.0), Duration::from_secs(5));
        assert_eq!(curve.delay_with_jitter(2, 2.0), Duration::from_secs(11));
    }

    #[test]
    fn blocked_curve_is_capped_at_sixty_seconds() {
        let curve = RetrievalPolicy::default().blocked;
        assert_eq!(curve.delay_with_jitter(4, 5.0), Duration::from_secs(60));
        assert_eq!(curve.delay_with_jitter(30, 2.0), Duration::from_secs(60));
    }

    #[test]
    fn rate_limited_curve_is_capped_at_two_minutes() {
        let curve = RetrievalPolicy::default().rate_limited;
        assert_eq!(curve.delay_with_jitter(1, 5.0), Duration::from_secs(9));
        assert_eq!(curve.delay_with_jitter(4, 5.0), Duration::from_secs(120));
    }

    #[test]
    fn flat_curve_ignores_attempt_number() {
        let curve = RetrievalPolicy::default().challenge;
        assert_eq!(curve.delay_with_jitter(0, 7.0), curve.delay_with_jitter(9, 7.0));
    }

    #[test]
    fn sampled_delay_stays_within_bounds() {
        let policy = RetrievalPolicy::default();
        for class in [
            FailureClass::BlockedByAntiBot,
            FailureClass::RateLimited,
            FailureClass::ChallengeUnresolved,
            FailureClass::TransportOrParse,
        ] {
            let curve = policy.backoff(class);
            for attempt in 0..6 {
                let (lo, hi) = curve.bounds(attempt);
                let d = curve.delay(attempt);
                assert!(d >= lo && d <= hi, "{class} attempt {attempt}: {d:?}");
            }
        }
    }

    #[test]
    fn zero_jitter_range_samples_zero() {
        assert_eq!(JitterRange::ZERO.sample(), Duration::ZERO);
    }

    #[test]
    fn from_millis_converts_to_seconds() {
        let range = JitterRange::from_millis(300, 800);
        assert!((range.min_secs - 0.3).abs() < f64::EPSILON);
        assert!((range.max_secs - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn classify_maps_status_errors() {
        let url = "https://rozetka.com.ua/ua/".to_owned();
        assert_eq!(
            FailureClass::of(&ScraperError::BlockedByAntiBot { url: url.clone() }),
            FailureClass::BlockedByAntiBot
        );
        assert_eq!(
            FailureClass::of(&ScraperError::RateLimited { url: url.clone() }),
            FailureClass::RateLimited
        );
        assert_eq!(
            FailureClass::of(&ScraperError::ChallengeUnresolved { url: url.clone() }),
            FailureClass::ChallengeUnresolved
        );
        assert_eq!(
            FailureClass::of(&ScraperError::UnexpectedStatus { status: 502, url }),
            FailureClass::TransportOrParse
        );
    }

    #[test]
    fn with_max_attempts_never_drops_below_one() {
        assert_eq!(RetrievalPolicy::default().with_max_attempts(0).max_attempts, 1);
    }
}
