//! Markup-to-text conversion for product descriptions.

use scraper::Html;

/// Extracts the text of an HTML fragment.
///
/// Every text node is trimmed, empty nodes are dropped, and the rest are
/// joined with a single space. Entities are decoded by the parser.
#[must_use]
pub fn strip_markup(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    parsed
        .root_element()
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
