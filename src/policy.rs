use crate::error::ScoutError;
use serde::{Deserialize, Serialize};

/// Upper bound on caller-supplied positive keywords
pub const MAX_POSITIVE_KEYWORDS: usize = 50;

const DEFAULT_POSITIVE: &[&str] = &[
    "trator",
    "tratores",
    "colheitadeira",
    "colhedora",
    "plantadeira",
    "semeadeira",
    "pulverizador",
    "grade aradora",
    "arado",
    "roçadeira",
    "carreta agrícola",
    "implemento agrícola",
    "implementos agrícolas",
    "máquina agrícola",
    "máquinas agrícolas",
    "maquinas agricolas",
    "retroescavadeira",
    "massey ferguson",
    "john deere",
    "new holland",
    "valtra",
    "case ih",
];

const DEFAULT_STRONG_NEGATIVE: &[&str] = &[
    "sucata",
    "miniatura",
    "brinquedo",
    "aluguel",
    "locação",
    "consórcio",
    "financiamento",
    "curso",
    "apostila",
];

const DEFAULT_WEAK_NEGATIVE: &[&str] = &[
    "notícia",
    "noticia",
    "blog",
    "evento",
    "vídeo",
    "video",
    "categoria",
    "ver todos",
    "buscar",
    "filtro",
];

const DEFAULT_EXEMPT_LABELS: &[&str] = &[
    "ver",
    "veja",
    "lote",
    "clique",
    "clique aqui",
    "saiba mais",
    "detalhes",
];

fn to_owned_list(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

/// Three-tier keyword policy used to classify links.
///
/// Matching is plain case-insensitive substring containment. There is no
/// stemming or fuzzy matching, so "trator" matches "tratores" but not
/// "tractor".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordPolicy {
    /// At least one must appear in the full context
    #[serde(default = "default_positive")]
    pub positive: Vec<String>,

    /// Vetoes a link when present anywhere in the full context
    #[serde(default = "default_strong_negative")]
    pub strong_negative: Vec<String>,

    /// Vetoes a link only when present in the link's own text/alt/title/href
    #[serde(default = "default_weak_negative")]
    pub weak_negative: Vec<String>,

    /// Generic link labels left out of the weak-negative context
    #[serde(default = "default_exempt_labels")]
    pub exempt_labels: Vec<String>,
}

fn default_positive() -> Vec<String> {
    to_owned_list(DEFAULT_POSITIVE)
}

fn default_strong_negative() -> Vec<String> {
    to_owned_list(DEFAULT_STRONG_NEGATIVE)
}

fn default_weak_negative() -> Vec<String> {
    to_owned_list(DEFAULT_WEAK_NEGATIVE)
}

fn default_exempt_labels() -> Vec<String> {
    to_owned_list(DEFAULT_EXEMPT_LABELS)
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        Self {
            positive: default_positive(),
            strong_negative: default_strong_negative(),
            weak_negative: default_weak_negative(),
            exempt_labels: default_exempt_labels(),
        }
    }
}

impl KeywordPolicy {
    /// Build a policy from explicit lists, keeping the default exempt labels
    pub fn new(
        positive: Vec<String>,
        strong_negative: Vec<String>,
        weak_negative: Vec<String>,
    ) -> Result<Self, ScoutError> {
        Self {
            positive,
            strong_negative,
            weak_negative,
            exempt_labels: default_exempt_labels(),
        }
        .normalized()
    }

    /// Lower-case and trim every term, dropping duplicates.
    ///
    /// Fails when the policy could never classify sanely: no positive terms,
    /// too many of them, or a blank term (which would match every context).
    pub fn normalized(self) -> Result<Self, ScoutError> {
        let positive = normalize_terms("positive", self.positive)?;
        if positive.is_empty() {
            return Err(ScoutError::InvalidPolicy(
                "at least one positive keyword is required".to_string(),
            ));
        }
        if positive.len() > MAX_POSITIVE_KEYWORDS {
            return Err(ScoutError::InvalidPolicy(format!(
                "{} positive keywords given, at most {} allowed",
                positive.len(),
                MAX_POSITIVE_KEYWORDS
            )));
        }

        Ok(Self {
            positive,
            strong_negative: normalize_terms("strong negative", self.strong_negative)?,
            weak_negative: normalize_terms("weak negative", self.weak_negative)?,
            exempt_labels: normalize_terms("exempt label", self.exempt_labels)?,
        })
    }

    /// Whether a cleaned link label is one of the generic exempt labels
    pub fn is_exempt_label(&self, label: &str) -> bool {
        let label = label.trim().to_lowercase();
        self.exempt_labels.iter().any(|l| *l == label)
    }
}

fn normalize_terms(kind: &str, terms: Vec<String>) -> Result<Vec<String>, ScoutError> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Err(ScoutError::InvalidPolicy(format!("blank {} keyword", kind)));
        }
        if !out.contains(&term) {
            out.push(term);
        }
    }
    Ok(out)
}
