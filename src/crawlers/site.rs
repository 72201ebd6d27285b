use crate::classifier::Classifier;
use crate::config::ScoutConfig;
use crate::crawlers::fetcher::{FetchedPage, Fetcher};
use crate::error::FetchError;
use crate::filter::LinkFilter;
use crate::parsers;
use crate::policy::KeywordPolicy;
use crate::results::{SiteResult, SiteStatus};
use crate::utils;
use std::collections::HashSet;
use url::Url;

impl From<&FetchError> for SiteStatus {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::Timeout => SiteStatus::Timeout,
            FetchError::DnsFailure => SiteStatus::DnsFailure,
            FetchError::ConnectionRefused => SiteStatus::ConnectionRefused,
            FetchError::HttpError(code) => SiteStatus::HttpError(*code),
            FetchError::Network(_) => SiteStatus::NetworkError,
        }
    }
}

/// Fetches one site and turns its anchors into a [`SiteResult`].
///
/// Immutable once built, so one analyzer is shared by every worker.
pub struct SiteAnalyzer<F> {
    fetcher: F,
    policy: KeywordPolicy,
    filter: LinkFilter,
    max_links: usize,
    short_content_bytes: usize,
    flagged_domains: Vec<String>,
}

impl<F: Fetcher> SiteAnalyzer<F> {
    /// `policy` must already be normalized
    pub fn new(fetcher: F, policy: KeywordPolicy, filter: LinkFilter, config: &ScoutConfig) -> Self {
        Self {
            fetcher,
            policy,
            filter,
            max_links: config.max_links_per_site,
            short_content_bytes: config.short_content_bytes,
            flagged_domains: config.flagged_domains.clone(),
        }
    }

    /// Runs one site to a terminal status. Never fails: fetch problems are
    /// reported through [`SiteResult::status`].
    pub async fn analyze(&self, url: &str) -> SiteResult {
        let flagged = utils::is_flagged(url, &self.flagged_domains);

        let source = match Url::parse(url) {
            Ok(source) => source,
            Err(e) => {
                ::log::warn!("Cannot analyze malformed URL {}: {}", url, e);
                return SiteResult::empty(url, SiteStatus::NetworkError, flagged);
            }
        };

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(err) => {
                ::log::warn!("Failed to fetch {}: {}", url, err);
                return SiteResult::empty(url, SiteStatus::from(&err), flagged);
            }
        };

        if page.status_code >= 400 {
            ::log::info!("{} answered HTTP {}", url, page.status_code);
            return SiteResult::empty(url, SiteStatus::HttpError(page.status_code), flagged);
        }

        self.examine(url, &source, &page, flagged)
    }

    /// Synchronous part: parse, classify, detect script-rendered content
    fn examine(&self, url: &str, source: &Url, page: &FetchedPage, flagged: bool) -> SiteResult {
        let status = if page.body_length() < self.short_content_bytes {
            ::log::debug!(
                "{} returned only {} bytes, content may be script rendered",
                url,
                page.body_length()
            );
            SiteStatus::ShortContent
        } else {
            SiteStatus::Online
        };

        let parsed = parsers::parse(&page.body, &self.filter, self.max_links);
        let classifier = Classifier::new(&self.policy);

        let mut links = Vec::new();
        let mut matched_terms: Vec<String> = Vec::new();
        let mut seen = HashSet::new();

        for anchor in &parsed.anchors {
            if links.len() >= self.max_links {
                break;
            }
            match classifier.classify(anchor, source) {
                Ok(found) => {
                    if !seen.insert(found.candidate.destination_url.clone()) {
                        continue;
                    }
                    for term in found.found_terms {
                        if !matched_terms.contains(&term) {
                            matched_terms.push(term);
                        }
                    }
                    links.push(found.candidate);
                }
                Err(reason) => {
                    ::log::trace!("Rejected {} on {}: {:?}", anchor.href, url, reason);
                }
            }
        }

        let script_rendered = links.is_empty() && self.scripts_mention_keywords(&parsed.script_text);
        if script_rendered {
            ::log::info!("{} mentions keywords only inside scripts", url);
        }

        SiteResult {
            url: url.to_string(),
            status,
            links,
            matched_terms,
            script_rendered,
            flagged,
        }
    }

    fn scripts_mention_keywords(&self, script_text: &str) -> bool {
        if script_text.is_empty() {
            return false;
        }
        let script_text = script_text.to_lowercase();
        self.policy
            .positive
            .iter()
            .any(|term| script_text.contains(term.as_str()))
    }
}
