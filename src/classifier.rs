use crate::parsers::AnchorInfo;
use crate::parsers::text::truncate_chars;
use crate::policy::KeywordPolicy;
use crate::results::LinkCandidate;
use url::Url;

/// Longest description kept on a candidate, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 150;
/// Descriptions shorter than this are replaced by ancestor text
pub const MIN_DESCRIPTION_CHARS: usize = 5;
/// How much ancestor text goes into a synthesized description
pub const AUTO_DESCRIPTION_CHARS: usize = 80;

/// Why an anchor was not turned into a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A strong-negative term appears somewhere in the full context
    StrongNegative(String),
    NoPositiveTerm,
    /// A weak-negative term appears in the link's own context
    WeakNegative(String),
    UnresolvableHref,
}

/// A matching anchor together with the positive terms it matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub candidate: LinkCandidate,
    pub found_terms: Vec<String>,
}

pub type Classification = Result<Match, Rejection>;

/// Applies a keyword policy to anchors.
///
/// The policy is expected to be normalized (lower-cased terms).
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    policy: &'a KeywordPolicy,
}

impl<'a> Classifier<'a> {
    pub fn new(policy: &'a KeywordPolicy) -> Self {
        Self { policy }
    }

    /// Decides whether one anchor is an opportunity.
    ///
    /// Order: strong-negative veto over the full context, positive terms over
    /// the full context, weak-negative veto over the link-local context, then
    /// href resolution against `source`.
    pub fn classify(&self, anchor: &AnchorInfo, source: &Url) -> Classification {
        let full_context = full_context(anchor);

        if let Some(term) = first_contained(&self.policy.strong_negative, &full_context) {
            return Err(Rejection::StrongNegative(term.to_string()));
        }

        let found_terms: Vec<String> = self
            .policy
            .positive
            .iter()
            .filter(|term| full_context.contains(term.as_str()))
            .cloned()
            .collect();
        if found_terms.is_empty() {
            return Err(Rejection::NoPositiveTerm);
        }

        let link_context = self.link_context(anchor);
        if let Some(term) = first_contained(&self.policy.weak_negative, &link_context) {
            return Err(Rejection::WeakNegative(term.to_string()));
        }

        let destination = source
            .join(&anchor.href)
            .map_err(|_| Rejection::UnresolvableHref)?;

        Ok(Match {
            candidate: LinkCandidate {
                description: describe(anchor),
                destination_url: destination.to_string(),
            },
            found_terms,
        })
    }

    /// Link text, alt, title and href, lower-cased. Generic exempt labels are
    /// left out so they never trip a weak negative on their own.
    fn link_context(&self, anchor: &AnchorInfo) -> String {
        let link_text = if self.policy.is_exempt_label(&anchor.link_text) {
            ""
        } else {
            anchor.link_text.as_str()
        };
        join_lower(&[
            link_text,
            anchor.img_alt_text.as_str(),
            anchor.title_attr.as_str(),
            anchor.href.as_str(),
        ])
    }
}

/// Link text, alt, title, ancestors and href, lower-cased
pub fn full_context(anchor: &AnchorInfo) -> String {
    join_lower(&[
        anchor.link_text.as_str(),
        anchor.img_alt_text.as_str(),
        anchor.title_attr.as_str(),
        anchor.ancestor_text.as_str(),
        anchor.href.as_str(),
    ])
}

/// Picks the first non-empty of link text, alt text and title. Labels too
/// short to be useful are replaced with a snippet of the ancestor text.
pub fn describe(anchor: &AnchorInfo) -> String {
    let chosen = [&anchor.link_text, &anchor.img_alt_text, &anchor.title_attr]
        .into_iter()
        .find(|s| !s.is_empty())
        .map(String::as_str)
        .unwrap_or("");

    let description = if chosen.chars().count() < MIN_DESCRIPTION_CHARS {
        format!(
            "[AUTO] {}...",
            truncate_chars(&anchor.ancestor_text, AUTO_DESCRIPTION_CHARS)
        )
    } else {
        chosen.to_string()
    };

    truncate_chars(&description, MAX_DESCRIPTION_CHARS).to_string()
}

fn join_lower(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn first_contained<'t>(terms: &'t [String], haystack: &str) -> Option<&'t str> {
    terms
        .iter()
        .find(|term| haystack.contains(term.as_str()))
        .map(String::as_str)
}
