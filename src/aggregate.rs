use crate::results::{Opportunity, SiteResult};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Flattens per-site matches into opportunities.
///
/// Destination URLs are unique in the output: the first occurrence in site
/// order wins. The result is sorted by source site, then description, with
/// [`locale_cmp`] (accents and case folded first).
pub fn aggregate(sites: &[SiteResult]) -> Vec<Opportunity> {
    let mut seen = HashSet::new();
    let mut opportunities = Vec::new();

    for site in sites {
        let matched_terms = site.matched_terms.join(", ");
        for link in &site.links {
            if !seen.insert(link.destination_url.as_str()) {
                ::log::trace!(
                    "Dropping duplicate {} from {}",
                    link.destination_url,
                    site.url
                );
                continue;
            }
            opportunities.push(Opportunity {
                source_site: site.url.clone(),
                matched_terms: matched_terms.clone(),
                description: link.description.clone(),
                destination_url: link.destination_url.clone(),
            });
        }
    }

    opportunities.sort_by(|a, b| {
        locale_cmp(&a.source_site, &b.source_site)
            .then_with(|| locale_cmp(&a.description, &b.description))
    });

    opportunities
}

/// Approximates a Portuguese collator: folded forms first, raw strings
/// second, so ordering is total. Only the accented letters of Latin-1 used
/// by Western European languages are folded; ligatures such as `æ`/`œ` and
/// Latin Extended letters compare by code point.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Lower-cases and strips Latin diacritics
fn collation_key(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{LinkCandidate, SiteStatus};

    fn site(url: &str, terms: &[&str], links: &[(&str, &str)]) -> SiteResult {
        SiteResult {
            url: url.to_string(),
            status: SiteStatus::Online,
            links: links
                .iter()
                .map(|(description, destination)| LinkCandidate {
                    description: description.to_string(),
                    destination_url: destination.to_string(),
                })
                .collect(),
            matched_terms: terms.iter().map(|t| t.to_string()).collect(),
            script_rendered: false,
            flagged: false,
        }
    }

    #[test]
    fn test_shared_destination_kept_once_for_first_site() {
        let sites = vec![
            site(
                "https://b.example",
                &["trator"],
                &[("Trator Valtra", "https://classificados.example/42")],
            ),
            site(
                "https://a.example",
                &["trator", "valtra"],
                &[
                    ("Valtra 785", "https://classificados.example/42"),
                    ("Trator Valtra BH", "https://a.example/7"),
                ],
            ),
        ];

        let result = aggregate(&sites);
        assert_eq!(result.len(), 2);

        let shared: Vec<_> = result
            .iter()
            .filter(|o| o.destination_url == "https://classificados.example/42")
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].source_site, "https://b.example");
        assert_eq!(shared[0].description, "Trator Valtra");

        // Sorted by source site
        assert_eq!(result[0].source_site, "https://a.example");
        assert_eq!(result[0].matched_terms, "trator, valtra");
    }

    #[test]
    fn test_sorted_by_site_then_description() {
        let sites = vec![site(
            "https://a.example",
            &["trator"],
            &[
                ("trator Valtra", "https://a.example/3"),
                ("Éxtra trator", "https://a.example/2"),
                ("Arado e trator", "https://a.example/1"),
            ],
        )];

        let descriptions: Vec<String> = aggregate(&sites)
            .into_iter()
            .map(|o| o.description)
            .collect();
        assert_eq!(
            descriptions,
            vec!["Arado e trator", "Éxtra trator", "trator Valtra"]
        );
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let sites = vec![
            site("https://z.example", &["trator"], &[("Z1", "https://z.example/1")]),
            site(
                "https://m.example",
                &["arado"],
                &[("M1", "https://z.example/1"), ("M2", "https://m.example/2")],
            ),
        ];
        let first = aggregate(&sites);
        let second = aggregate(&sites);
        assert_eq!(first, second);

        let urls: HashSet<&str> = first.iter().map(|o| o.destination_url.as_str()).collect();
        assert_eq!(urls.len(), first.len());
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("édito", "Edito"), Ordering::Greater);
        assert_eq!(locale_cmp("Édito", "fazenda"), Ordering::Less);
        assert_eq!(locale_cmp("abc", "ABD"), Ordering::Less);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_locale_cmp_folds_portuguese_accents_only() {
        assert_eq!(locale_cmp("Ração", "racao"), Ordering::Less);
        assert_eq!(locale_cmp("Ração", "ração"), Ordering::Less);
        assert_eq!(locale_cmp("roçadeira", "rotativa"), Ordering::Less);
        assert_eq!(locale_cmp("Søren", "Sorensen"), Ordering::Less);
        // Ligatures are not expanded
        assert_eq!(locale_cmp("æ", "b"), Ordering::Greater);
    }
}
