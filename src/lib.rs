//! Scans a list of sites for links that look like opportunities (listings
//! that match a keyword policy) and returns them deduplicated across sites.

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod policy;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{ScanRequest, ScoutConfig};
pub use error::{FetchError, ScoutError};
pub use policy::KeywordPolicy;
pub use results::{
    LinkCandidate, Opportunity, ScanMeta, ScanReport, SiteProgress, SiteResult, SiteStatus,
};

use crawlers::{Fetcher, HttpFetcher, SiteAnalyzer};
use filter::LinkFilter;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Main builder for running a scan
#[derive(Debug, Clone, Default)]
pub struct Scout {
    config: ScoutConfig,
    progress: Option<mpsc::UnboundedSender<SiteProgress>>,
}

impl Scout {
    /// Create a new scout with the given configuration
    pub fn new(config: ScoutConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Set the maximum number of sites analyzed at once
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.concurrency_limit = max_concurrency;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    /// Set the per-site link cap
    pub fn with_max_links_per_site(mut self, max_links: usize) -> Self {
        self.config.max_links_per_site = max_links;
        self
    }

    /// Receive a [`SiteProgress`] for every finished site
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<SiteProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    /// Scan over HTTP
    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanReport, ScoutError> {
        self.config.validate()?;
        let fetcher = HttpFetcher::new(&self.config)?;
        self.scan_with(fetcher, request).await
    }

    /// Scan using a caller-supplied fetcher.
    ///
    /// Per-site failures only show up in [`ScanReport::sites`] and the log;
    /// an `Err` means the scan as a whole could not run.
    pub async fn scan_with<F>(
        &self,
        fetcher: F,
        request: &ScanRequest,
    ) -> Result<ScanReport, ScoutError>
    where
        F: Fetcher + 'static,
    {
        let started = Instant::now();

        self.config.validate()?;
        let urls = request.validated_urls()?;
        let policy = request.policy(&self.config.policy)?;
        let filter = LinkFilter::new(&self.config.filter)?;

        let analyzer = Arc::new(SiteAnalyzer::new(fetcher, policy, filter, &self.config));
        let sites =
            crawlers::run_batch(analyzer, urls, self.config.workers(), self.progress.clone()).await?;

        let data = aggregate::aggregate(&sites);
        let meta = ScanMeta {
            total_sites: sites.len(),
            opportunities_found: data.len(),
            duration_ms: utils::millis(started.elapsed()),
        };
        ::log::info!(
            "Scan finished: {} opportunities from {} sites in {} ms",
            meta.opportunities_found,
            meta.total_sites,
            meta.duration_ms
        );

        Ok(ScanReport { meta, data, sites })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawlers::FetchedPage;
    use crate::crawlers::testing::StaticFetcher;

    fn listing_page(links: &[(&str, &str)]) -> FetchedPage {
        let mut body = String::from("<html><body><main>");
        for (href, text) in links {
            body.push_str(&format!(
                "<section><article><div><a href=\"{href}\">{text}</a></div></article></section>"
            ));
        }
        body.push_str("</main></body></html>");
        FetchedPage::new(200, body)
    }

    #[tokio::test]
    async fn test_scan_dedupes_across_sites() {
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://b.example/",
                listing_page(&[
                    ("https://classificados.example/trator-42", "Trator Massey Ferguson 275"),
                    ("/colheitadeira", "Colheitadeira New Holland"),
                ]),
            )
            .with_page(
                "https://a.example/",
                listing_page(&[("https://classificados.example/trator-42", "Trator MF 275 usado")]),
            )
            .with_error("https://c.example/", FetchError::Timeout);

        let request = ScanRequest::new(vec![
            "https://b.example/".to_string(),
            "https://a.example/".to_string(),
            "https://c.example/".to_string(),
            "not a url".to_string(),
        ]);

        let report = Scout::default().scan_with(fetcher, &request).await.unwrap();

        assert_eq!(report.meta.total_sites, 3);
        assert_eq!(report.meta.opportunities_found, 2);
        assert_eq!(report.data.len(), 2);

        let shared = report
            .data
            .iter()
            .find(|o| o.destination_url == "https://classificados.example/trator-42")
            .unwrap();
        assert_eq!(shared.source_site, "https://b.example/");
        assert!(
            report
                .data
                .iter()
                .all(|o| o.source_site == "https://b.example/")
        );

        assert_eq!(report.sites[2].status, SiteStatus::Timeout);
        assert_eq!(report.sites[1].links.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_uses_request_keywords() {
        let fetcher = StaticFetcher::new().with_page(
            "https://a.example/",
            listing_page(&[("/p/1", "Pulverizador Jacto"), ("/p/2", "Trator Valtra")]),
        );
        let request = ScanRequest {
            positive_keywords: Some(vec!["Pulverizador".to_string()]),
            ..ScanRequest::new(vec!["https://a.example/".to_string()])
        };

        let report = Scout::default().scan_with(fetcher, &request).await.unwrap();
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].description, "Pulverizador Jacto");
        assert_eq!(report.data[0].matched_terms, "pulverizador");
    }

    #[tokio::test]
    async fn test_invalid_policy_fails_whole_scan() {
        let request = ScanRequest {
            positive_keywords: Some(vec!["   ".to_string()]),
            ..ScanRequest::new(vec!["https://a.example/".to_string()])
        };
        let result = Scout::default().scan_with(StaticFetcher::new(), &request).await;
        assert!(matches!(result, Err(ScoutError::InvalidPolicy(_))));
    }

    #[test]
    fn test_builder_overrides() {
        let scout = Scout::new(ScoutConfig::default())
            .with_max_concurrency(8)
            .with_timeout_ms(1_000)
            .with_max_links_per_site(10);
        assert_eq!(scout.config().concurrency_limit, 8);
        assert_eq!(scout.config().timeout_ms, 1_000);
        assert_eq!(scout.config().max_links_per_site, 10);
    }
}
