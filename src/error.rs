//! Error taxonomy for the acquisition paths.
//!
//! Errors are scoped to one unit of work (one request, one source, one
//! search call). Callers absorb them at that boundary and turn them into
//! partial results plus a status signal; only [`ConfigError`] is meant to
//! reach the caller that built the component.
//!
//! An empty listing page or a search with zero hits is not an error and has
//! no variant here: both are plain empty vectors.

use thiserror::Error;

/// Failure of a single HTTP GET.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("cannot build HTTP client: {message}")]
    Client { message: String },
}

impl FetchError {
    /// Classify a `reqwest` error for `url`.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// A newspaper could not be crawled at all.
///
/// Failures after the first listing page only truncate the result and never
/// surface as a `CrawlError`.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("first listing page failed: {0}")]
    FirstPage(#[source] FetchError),

    #[error("crawl did not finish within {secs}s")]
    TimedOut { secs: u64 },
}

/// Failure of the structured search API for one call.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search API credentials are not configured")]
    MissingCredentials,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed search API payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Impossible or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },

    #[error("page_delay_min_ms ({min}) is greater than page_delay_max_ms ({max})")]
    DelayRange { min: u64, max: u64 },

    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
