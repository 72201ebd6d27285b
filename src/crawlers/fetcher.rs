use crate::config::ScoutConfig;
use crate::error::{FetchError, ScoutError};
use rand::seq::SliceRandom;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Fallback when the configured pool is somehow empty
const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// A page that answered with a status below 500
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status_code: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Body size in bytes
    pub fn body_length(&self) -> usize {
        self.body.len()
    }
}

/// Retrieves one URL.
///
/// Status codes >= 500 must come back as [`FetchError::HttpError`]; anything
/// below is returned as a page for the caller to interpret.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// HTTP fetcher with browser-like headers, a rotating user agent and relaxed
/// certificate validation (target sites often serve broken certificates).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agents: Vec<String>,
    retries: u32,
}

impl HttpFetcher {
    pub fn new(config: &ScoutConfig) -> Result<Self, ScoutError> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .danger_accept_invalid_certs(true)
            .build()?;

        let user_agents = config
            .user_agents
            .iter()
            .filter(|ua| !ua.trim().is_empty())
            .cloned()
            .collect();

        Ok(Self {
            client,
            user_agents,
            retries: config.retries,
        })
    }

    fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(FALLBACK_USER_AGENT)
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let user_agent = self.pick_user_agent().to_string();

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| classify_error(&e))?;

        let status_code = response.status().as_u16();
        if status_code >= 500 {
            return Err(FetchError::HttpError(status_code));
        }

        let body = response.text().await.map_err(|e| classify_error(&e))?;
        Ok(FetchedPage { status_code, body })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    ::log::debug!(
                        "Retrying {} after {} (attempt {} of {})",
                        url,
                        err,
                        attempt,
                        self.retries
                    );
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
                outcome => return outcome,
            }
        }
    }
}

/// Linear backoff: 500ms after the first failure, 1s after the second, ...
fn retry_delay(attempt: u32) -> Duration {
    RETRY_BASE_DELAY * attempt
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

fn classify_error(err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout;
    }
    classify_chain(err)
}

/// Maps an error and its sources onto the fetch failure taxonomy
pub(crate) fn classify_chain(err: &(dyn StdError + 'static)) -> FetchError {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionRefused => return FetchError::ConnectionRefused,
                std::io::ErrorKind::TimedOut => return FetchError::Timeout,
                _ => {}
            }
        }

        let msg = e.to_string().to_lowercase();
        if msg.contains("dns error")
            || msg.contains("failed to lookup address")
            || msg.contains("name or service not known")
            || msg.contains("no such host")
        {
            return FetchError::DnsFailure;
        }
        if msg.contains("connection refused") {
            return FetchError::ConnectionRefused;
        }

        current = e.source();
    }

    FetchError::Network(err.to_string())
}
