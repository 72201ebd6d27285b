use thiserror::Error;

/// Why a single page could not be retrieved.
///
/// These never abort a batch; the site analyzer turns each one into a
/// terminal [`SiteStatus`](crate::results::SiteStatus).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("DNS lookup failed")]
    DnsFailure,

    #[error("connection refused")]
    ConnectionRefused,

    /// Server-side failure (status >= 500)
    #[error("server responded with HTTP {0}")]
    HttpError(u16),

    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Whether another attempt at the same URL could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout | FetchError::Network(_) | FetchError::HttpError(_)
        )
    }
}

/// Failures that abort a whole scan.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("invalid keyword policy: {0}")]
    InvalidPolicy(String),

    #[error("invalid scan request: {0}")]
    InvalidRequest(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("worker failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<regex::Error> for ScoutError {
    fn from(err: regex::Error) -> Self {
        ScoutError::Config(format!("bad exclude pattern: {}", err))
    }
}
