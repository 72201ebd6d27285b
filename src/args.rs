use clap::Parser;
use link_scout::ScoutConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "link-scout")]
#[command(about = "Scans sites for links matching a keyword policy")]
#[command(version)]
pub struct Args {
    /// Site URLs to scan
    pub urls: Vec<String>,

    /// File with one URL per line (blank lines and # comments are skipped)
    #[arg(short = 'f', long)]
    pub urls_file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Positive keywords, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Strong negative keywords, comma separated
    #[arg(long, value_delimiter = ',')]
    pub strong_negative: Vec<String>,

    /// Weak negative keywords, comma separated
    #[arg(long, value_delimiter = ',')]
    pub weak_negative: Vec<String>,

    /// Number of sites scanned concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Maximum links kept per site
    #[arg(long)]
    pub max_links: Option<usize>,

    /// Extra attempts for transient fetch failures
    #[arg(long)]
    pub retries: Option<u32>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut ScoutConfig) {
        if let Some(concurrency) = self.concurrency {
            config.concurrency_limit = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(max_links) = self.max_links {
            config.max_links_per_site = max_links;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
    }
}

/// Parse a URL list: one per line, `#` starts a comment
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// `None` when the flag was not given, so request defaults apply
pub fn keyword_list(values: &[String]) -> Option<Vec<String>> {
    let list: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if list.is_empty() { None } else { Some(list) }
}
