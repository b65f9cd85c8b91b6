use std::path::PathBuf;

/// Errors that can occur while fetching, parsing or saving images.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Connection, timeout or body-read failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response.
    #[error("HTTP {status} {reason}")]
    Status {
        status: u16,
        reason: String,
        /// First characters of the response body, for diagnostics.
        excerpt: String,
    },

    #[error("Unexpected content type: expected {expected}, got '{actual}'")]
    UnexpectedContentType {
        expected: &'static str,
        actual: String,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Failed writing {}: {source}", path.display())]
    PartialWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid URL '{url}': {message}")]
    Url { url: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ScrapeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl ScrapeError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn url(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Url {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// HTTP 429 Too Many Requests.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 429, .. })
    }

    /// Errors the tag-search retry loop treats as transient network trouble
    /// (and so waits longer before retrying).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
