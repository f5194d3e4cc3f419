//! Browser-like request headers and URL helpers for the retrieval client.

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER, USER_AGENT,
};

use super::transport::RawResponse;

/// Storefront pages carrying this fragment get a `Referer` header.
const SITE_PATH_FRAGMENT: &str = "rozetka.com.ua/ua/";
pub(crate) const SITE_REFERER: &str = "https://rozetka.com.ua/ua/";
/// API hosts that never receive a `Referer`, even when the query mentions the site.
const REFERER_EXEMPT_PREFIXES: [&str; 2] = ["https://common-api", "https://product-api"];

/// Body fragments of the interstitial challenge page.
const CHALLENGE_MARKERS: [&str; 3] = ["cf-chl-", "challenge-platform", "Just a moment..."];

const SHORT_PATH_CHARS: usize = 50;

/// Fixed header set sent with every request.
pub(crate) fn baseline_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(user_agent) {
        Ok(value) => {
            headers.insert(USER_AGENT, value);
        }
        Err(e) => {
            tracing::warn!(error = %e, "user agent is not a valid header value; using transport default");
        }
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("uk-UA,uk;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// Returns the `Referer` to attach to `url`, if any.
pub(crate) fn referer_for(url: &str) -> Option<&'static str> {
    let exempt = REFERER_EXEMPT_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix));
    (url.contains(SITE_PATH_FRAGMENT) && !exempt).then_some(SITE_REFERER)
}

/// Baseline headers plus the conditional `Referer` for one request.
pub(crate) fn request_headers(baseline: &HeaderMap, url: &str) -> HeaderMap {
    let mut headers = baseline.clone();
    if let Some(referer) = referer_for(url) {
        headers.insert(REFERER, HeaderValue::from_static(referer));
    }
    headers
}

/// `true` when the response is the bot-challenge interstitial rather than content.
pub(crate) fn is_challenge(response: &RawResponse) -> bool {
    let mitigated = response
        .headers
        .get("cf-mitigated")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("challenge"));
    if mitigated {
        return true;
    }
    matches!(response.status, 403 | 503)
        && CHALLENGE_MARKERS
            .iter()
            .any(|marker| response.body.contains(marker))
}

/// Host plus the first 50 characters of the path, for log lines.
pub(crate) fn short_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            let path: String = parsed.path().chars().take(SHORT_PATH_CHARS).collect();
            format!("{host}{path}")
        }
        Err(_) => url.chars().take(SHORT_PATH_CHARS).collect(),
    }
}
