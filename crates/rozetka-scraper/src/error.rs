use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport-level failure reported by a non-`reqwest` transport.
    #[error("transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("blocked by anti-bot protection (HTTP 403) at {url}")]
    BlockedByAntiBot { url: String },

    #[error("rate limited (HTTP 429) at {url}")]
    RateLimited { url: String },

    #[error("anti-bot challenge was not resolved at {url}")]
    ChallengeUnresolved { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("request to {url} failed after {attempts} attempts: {last_error}")]
    ExhaustedRetries {
        url: String,
        attempts: u32,
        #[source]
        last_error: Box<ScraperError>,
    },

    #[error("comment page {page} of product {product_id} carried no data")]
    MissingCommentPage { product_id: String, page: u32 },

    #[error("comment pages of product {product_id} declare an invalid page count: {raw}")]
    InvalidCommentPageCount { product_id: String, raw: String },

    #[error("invalid transport setting \"{value}\": {reason}")]
    InvalidSetting { value: String, reason: String },
}
