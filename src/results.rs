use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal state of one analyzed site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code")]
pub enum SiteStatus {
    /// Page fetched with enough static content
    Online,
    /// Page fetched but suspiciously small, likely rendered by script
    ShortContent,
    /// Page answered with a status code >= 400
    HttpError(u16),
    Timeout,
    DnsFailure,
    ConnectionRefused,
    NetworkError,
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteStatus::Online => write!(f, "online"),
            SiteStatus::ShortContent => write!(f, "short content"),
            SiteStatus::HttpError(code) => write!(f, "HTTP {}", code),
            SiteStatus::Timeout => write!(f, "timeout"),
            SiteStatus::DnsFailure => write!(f, "DNS failure"),
            SiteStatus::ConnectionRefused => write!(f, "connection refused"),
            SiteStatus::NetworkError => write!(f, "network error"),
        }
    }
}

/// A matching link found on one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCandidate {
    /// Human readable label, at most 150 characters
    pub description: String,
    /// Absolute destination URL
    pub destination_url: String,
}

/// Outcome of analyzing one input URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResult {
    pub url: String,
    pub status: SiteStatus,
    pub links: Vec<LinkCandidate>,
    /// Positive terms that produced at least one match, each once
    pub matched_terms: Vec<String>,
    /// Relevant terms appear only inside inline scripts
    pub script_rendered: bool,
    pub flagged: bool,
}

impl SiteResult {
    /// Result for a site that produced nothing to classify
    pub fn empty(url: &str, status: SiteStatus, flagged: bool) -> Self {
        Self {
            url: url.to_string(),
            status,
            links: Vec::new(),
            matched_terms: Vec::new(),
            script_rendered: false,
            flagged,
        }
    }
}

/// Flattened, cross-site view of a matching link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub source_site: String,
    /// The site's matched terms joined with ", "
    pub matched_terms: String,
    pub description: String,
    pub destination_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMeta {
    pub total_sites: usize,
    pub opportunities_found: usize,
    pub duration_ms: u64,
}

/// Final payload of a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub meta: ScanMeta,
    pub data: Vec<Opportunity>,

    /// Per-site results, in input order
    #[serde(skip)]
    pub sites: Vec<SiteResult>,
}

/// Progress notification emitted once per completed site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProgress {
    /// Position of the site in the input list
    pub index: usize,
    /// How many sites have finished so far, this one included
    pub completed: usize,
    pub total: usize,
    pub url: String,
    pub status: SiteStatus,
    pub match_count: usize,
    pub script_rendered: bool,
    pub flagged: bool,
}

impl SiteProgress {
    pub fn from_result(index: usize, completed: usize, total: usize, result: &SiteResult) -> Self {
        Self {
            index,
            completed,
            total,
            url: result.url.clone(),
            status: result.status,
            match_count: result.links.len(),
            script_rendered: result.script_rendered,
            flagged: result.flagged,
        }
    }
}
