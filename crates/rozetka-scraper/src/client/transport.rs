//! Outbound HTTP transport used by [`super::Session`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::{Client, Url};

use crate::error::ScraperError;

/// Cookie scope for a pre-solved clearance cookie; covers the API subdomains.
const CLEARANCE_COOKIE_ORIGIN: &str = "https://rozetka.com.ua/";
const CLEARANCE_COOKIE_DOMAIN: &str = "rozetka.com.ua";

/// Status, headers, and fully-read body of one response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Sends a single GET. Implementations do no retrying or status handling.
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`ScraperError`] when no response could be obtained.
    fn get(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> impl Future<Output = Result<RawResponse, ScraperError>> + Send;
}

/// Construction parameters for [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct TransportSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub proxy_url: Option<String>,
    /// `name=value` cookie seeded into the session jar for the whole site.
    pub clearance_cookie: Option<String>,
}

/// `reqwest`-backed transport with a session cookie jar and optional proxy.
///
/// The jar keeps any challenge-clearance cookie (seeded or set by the site)
/// for the lifetime of the session, so later requests pass the interstitial
/// without solving it again.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the proxy URL is rejected or the
    /// client cannot be built, and [`ScraperError::InvalidSetting`] if the
    /// clearance cookie origin cannot be parsed.
    pub fn new(settings: &TransportSettings) -> Result<Self, ScraperError> {
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &settings.clearance_cookie {
            let origin =
                Url::parse(CLEARANCE_COOKIE_ORIGIN).map_err(|e| ScraperError::InvalidSetting {
                    value: CLEARANCE_COOKIE_ORIGIN.to_owned(),
                    reason: e.to_string(),
                })?;
            jar.add_cookie_str(
                &format!("{cookie}; Domain={CLEARANCE_COOKIE_DOMAIN}; Path=/"),
                &origin,
            );
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .cookie_provider(jar);

        if let Some(proxy_url) = &settings.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
            tracing::info!(
                proxy = %rozetka_core::app_config::redact_proxy(proxy_url),
                "routing requests through proxy"
            );
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<RawResponse, ScraperError> {
        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status().as_u16();
        // Headers must be cloned before the body consumes the response.
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
