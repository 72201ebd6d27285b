pub mod html;
pub mod text;


pub use html::AnchorInfo;

use crate::filter::LinkFilter;
use scraper::Html;

/// What a fetched page yields for classification
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Candidate anchors, in document order
    pub anchors: Vec<AnchorInfo>,
    /// Inline script contents, used for the script-rendered heuristic
    pub script_text: String,
}

/// Parses a page body into anchors and inline script text.
///
/// The parsed tree never outlives this call, so callers in async code can
/// use it freely between await points.
pub fn parse(body: &str, filter: &LinkFilter, max_anchors: usize) -> ParseResult {
    let doc = Html::parse_document(body);
    let anchors = html::extract_anchors(&doc, filter, max_anchors);
    let script_text = html::inline_scripts(&doc);

    ::log::debug!("HTML parser kept {} anchors", anchors.len());

    ParseResult {
        anchors,
        script_text,
    }
}
