use thiserror::Error;

/// Failures that cross the scraper's boundary.
///
/// Only fetch-level problems surface as errors; extraction components are
/// total and report misses as `None`/empty values instead (a selector that
/// finds nothing is data, not a failure).
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected feed shape from {url}: {reason}")]
    FeedShape { url: String, reason: String },
}
