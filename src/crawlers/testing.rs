//! In-memory fetcher used by the crawler tests.

use crate::crawlers::fetcher::{FetchedPage, Fetcher};
use crate::error::FetchError;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Serves canned outcomes keyed by URL; unknown URLs fail DNS
#[derive(Debug, Default)]
pub struct StaticFetcher {
    outcomes: HashMap<String, Result<FetchedPage, FetchError>>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, page: FetchedPage) -> Self {
        self.outcomes.insert(url.to_string(), Ok(page));
        self
    }

    pub fn with_error(mut self, url: &str, err: FetchError) -> Self {
        self.outcomes.insert(url.to_string(), Err(err));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle reporting the highest number of simultaneous fetches seen
    pub fn peak(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.peak)
    }
}

impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outcomes
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::DnsFailure))
    }
}
