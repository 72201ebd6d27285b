use crate::error::ScoutError;
use crate::filter::LinkFilterConfig;
use crate::policy::KeywordPolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Upper bound on URLs accepted in one scan request
pub const MAX_URLS_PER_REQUEST: usize = 500;

/// Configuration for a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum anchors processed (and links kept) per site
    #[serde(default = "default_max_links_per_site")]
    pub max_links_per_site: usize,

    /// Maximum number of sites analyzed at the same time
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Extra attempts for transient fetch failures
    #[serde(default)]
    pub retries: u32,

    /// Successful pages smaller than this are reported as short content
    #[serde(default = "default_short_content_bytes")]
    pub short_content_bytes: usize,

    /// User-agent strings, one picked at random per request
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Hosts (or host fragments) reported with `flagged = true`
    #[serde(default)]
    pub flagged_domains: Vec<String>,

    /// Href pre-filter
    #[serde(default)]
    pub filter: LinkFilterConfig,

    /// Policy used when a request does not carry its own keywords
    #[serde(default)]
    pub policy: KeywordPolicy,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_links_per_site() -> usize {
    150
}

fn default_concurrency_limit() -> usize {
    5
}

fn default_short_content_bytes() -> usize {
    5_000
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36 Edg/123.0.0.0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_links_per_site: default_max_links_per_site(),
            concurrency_limit: default_concurrency_limit(),
            retries: 0,
            short_content_bytes: default_short_content_bytes(),
            user_agents: default_user_agents(),
            flagged_domains: Vec::new(),
            filter: LinkFilterConfig::default(),
            policy: KeywordPolicy::default(),
        }
    }
}

impl ScoutConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScoutError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ScoutError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the scan cannot run with
    pub fn validate(&self) -> Result<(), ScoutError> {
        if self.timeout_ms == 0 {
            return Err(ScoutError::Config("timeout_ms must be positive".to_string()));
        }
        if self.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return Err(ScoutError::Config(
                "at least one user agent is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Concurrency limit, never below one
    pub fn workers(&self) -> usize {
        self.concurrency_limit.max(1)
    }
}

/// Input payload of a scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strong_negative_keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weak_negative_keywords: Option<Vec<String>>,
}

impl ScanRequest {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls,
            ..Self::default()
        }
    }

    /// Checks size limits and returns the URLs that parse as absolute
    /// http(s) URLs, in input order. Malformed entries are dropped.
    pub fn validated_urls(&self) -> Result<Vec<String>, ScoutError> {
        if self.urls.len() > MAX_URLS_PER_REQUEST {
            return Err(ScoutError::InvalidRequest(format!(
                "{} URLs given, at most {} allowed",
                self.urls.len(),
                MAX_URLS_PER_REQUEST
            )));
        }

        let mut urls = Vec::with_capacity(self.urls.len());
        for raw in &self.urls {
            let raw = raw.trim();
            match Url::parse(raw) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => urls.push(raw.to_string()),
                _ => ::log::warn!("Dropping malformed URL: {:?}", raw),
            }
        }
        Ok(urls)
    }

    /// Merges request keywords over `base`. Missing or empty lists keep the
    /// base list.
    pub fn policy(&self, base: &KeywordPolicy) -> Result<KeywordPolicy, ScoutError> {
        fn pick(custom: &Option<Vec<String>>, fallback: &[String]) -> Vec<String> {
            match custom {
                Some(list) if !list.is_empty() => list.clone(),
                _ => fallback.to_vec(),
            }
        }

        KeywordPolicy {
            positive: pick(&self.positive_keywords, &base.positive),
            strong_negative: pick(&self.strong_negative_keywords, &base.strong_negative),
            weak_negative: pick(&self.weak_negative_keywords, &base.weak_negative),
            exempt_labels: base.exempt_labels.clone(),
        }
        .normalized()
    }
}
