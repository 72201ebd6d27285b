use crate::filter::LinkFilter;
use crate::parsers::text;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("static selector"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt]").expect("static selector"));
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("static selector"));

/// Number of ancestor levels whose text is folded into an anchor's context
pub const ANCESTOR_LEVELS: usize = 3;

/// Everything known about one anchor that the classifier looks at.
///
/// All text fields are whitespace-cleaned but keep their original case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorInfo {
    /// Raw href attribute, trimmed
    pub href: String,
    pub link_text: String,
    /// Alt text of the first image inside the anchor
    pub img_alt_text: String,
    pub title_attr: String,
    /// Cleaned text of the parent, grandparent and great-grandparent
    pub ancestor_text: String,
}

/// Enumerates anchors in document order and builds their context.
///
/// Anchors without an href, and anchors whose href the filter ignores, are
/// skipped before any text is collected. Extraction stops once
/// `max_anchors` anchors have been kept.
pub fn extract_anchors(doc: &Html, filter: &LinkFilter, max_anchors: usize) -> Vec<AnchorInfo> {
    let mut anchors = Vec::new();
    if max_anchors == 0 {
        return anchors;
    }

    for element in doc.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if filter.is_ignored(href) {
            ::log::trace!("Ignoring href: {}", href);
            continue;
        }

        anchors.push(build_anchor_info(element, href));
        if anchors.len() >= max_anchors {
            ::log::debug!("Anchor cap of {} reached, stopping extraction", max_anchors);
            break;
        }
    }

    anchors
}

fn build_anchor_info(element: ElementRef<'_>, href: &str) -> AnchorInfo {
    let img_alt_text = element
        .select(&IMG_SELECTOR)
        .find_map(|img| img.value().attr("alt"))
        .map(text::clean)
        .unwrap_or_default();

    AnchorInfo {
        href: href.trim().to_string(),
        link_text: text::text_content(element.text()),
        img_alt_text,
        title_attr: element
            .value()
            .attr("title")
            .map(text::clean)
            .unwrap_or_default(),
        ancestor_text: ancestor_text(element, ANCESTOR_LEVELS),
    }
}

/// Concatenates the cleaned text of up to `levels` element ancestors,
/// nearest first. Stops at the document root.
pub fn ancestor_text(element: ElementRef<'_>, levels: usize) -> String {
    let mut parts = Vec::with_capacity(levels);
    let mut current = element.parent().and_then(ElementRef::wrap);

    for _ in 0..levels {
        let Some(ancestor) = current else {
            break;
        };
        let cleaned = text::text_content(ancestor.text());
        if !cleaned.is_empty() {
            parts.push(cleaned);
        }
        current = ancestor.parent().and_then(ElementRef::wrap);
    }

    parts.join(" ")
}

/// Raw contents of every inline (non-`src`) script element, newline joined
pub fn inline_scripts(doc: &Html) -> String {
    doc.select(&SCRIPT_SELECTOR)
        .filter(|script| script.value().attr("src").is_none())
        .map(|script| script.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
