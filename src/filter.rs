use regex::Regex;
use serde::{Deserialize, Serialize};

/// Configuration for the href pre-filter applied before any context building
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Substrings that disqualify an href outright (checked case-insensitively)
    #[serde(default = "default_ignore_substrings")]
    pub ignore_substrings: Vec<String>,

    /// Extra regex patterns for hrefs to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Social platforms, auth/account paths, in-page anchors, non-http schemes
/// and common navigation noise.
fn default_ignore_substrings() -> Vec<String> {
    [
        "facebook.com",
        "instagram.com",
        "twitter.com",
        "//x.com",
        "linkedin.com",
        "youtube.com",
        "youtu.be",
        "tiktok.com",
        "pinterest.",
        "wa.me",
        "whatsapp",
        "t.me/",
        "/login",
        "/logout",
        "/signin",
        "/signup",
        "/register",
        "/cadastro",
        "/account",
        "/minha-conta",
        "/my-account",
        "/carrinho",
        "/cart",
        "/checkout",
        "/wp-admin",
        "/wp-login",
        "/feed",
        "/politica-de-privacidade",
        "/privacy",
        "/termos",
        "/terms",
        "/contato",
        "/contact",
        "#",
        "javascript:",
        "mailto:",
        "tel:",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            ignore_substrings: default_ignore_substrings(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Cheap href filter: rejects anchors that can never be opportunities
#[derive(Debug)]
pub struct LinkFilter {
    ignore_substrings: Vec<String>,
    exclude_regexes: Vec<Regex>,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self {
            ignore_substrings: default_ignore_substrings(),
            exclude_regexes: Vec::new(),
        }
    }
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: &LinkFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        let ignore_substrings = config
            .ignore_substrings
            .iter()
            .map(|s| s.to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            ignore_substrings,
            exclude_regexes,
        })
    }

    /// Whether a raw href should be skipped before extraction
    pub fn is_ignored(&self, href: &str) -> bool {
        let href = href.trim();
        if href.is_empty() {
            return true;
        }

        let lowered = href.to_lowercase();
        if self
            .ignore_substrings
            .iter()
            .any(|needle| lowered.contains(needle.as_str()))
        {
            return true;
        }

        self.exclude_regexes.iter().any(|re| re.is_match(href))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = LinkFilter::default();

        assert!(filter.is_ignored("https://www.facebook.com/loja"));
        assert!(filter.is_ignored("/minha-conta/pedidos"));
        assert!(filter.is_ignored("#topo"));
        assert!(filter.is_ignored("JavaScript:void(0)"));
        assert!(filter.is_ignored("mailto:vendas@example.com"));
        assert!(filter.is_ignored("tel:+5511999999999"));
        assert!(filter.is_ignored("   "));

        assert!(!filter.is_ignored("/anuncio/trator-valtra-785"));
        assert!(!filter.is_ignored("https://example.com/maquinas/colheitadeira"));
    }

    #[test]
    fn test_exclude_patterns() {
        let config = LinkFilterConfig {
            ignore_substrings: vec![],
            exclude_patterns: vec![r"\.(pdf|jpg|png)$".to_string()],
        };
        let filter = LinkFilter::new(&config).unwrap();

        assert!(filter.is_ignored("/catalogo/trator.pdf"));
        assert!(!filter.is_ignored("/catalogo/trator"));
        // Empty substring lists must not ignore everything
        assert!(!filter.is_ignored("#topo"));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = LinkFilterConfig {
            ignore_substrings: vec![],
            exclude_patterns: vec!["(unclosed".to_string()],
        };
        assert!(LinkFilter::new(&config).is_err());
    }
}
