use std::time::Duration;
use url::Url;

/// Whether the URL's host contains any of the given domain fragments
/// (case-insensitive). Unparseable URLs are never flagged.
pub fn is_flagged(url: &str, flagged_domains: &[String]) -> bool {
    if flagged_domains.is_empty() {
        return false;
    }
    let Some(host) = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
    else {
        return false;
    };

    flagged_domains
        .iter()
        .map(|d| d.trim().to_lowercase())
        .any(|d| !d.is_empty() && host.contains(&d))
}

/// Whole milliseconds, saturating instead of overflowing
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
