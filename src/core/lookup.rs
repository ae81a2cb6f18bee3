//! DOM lookups shared by the probe steps and the platform strategies.

use mathcopy_dom::{parse_selector, Node};

use crate::utils::error::ExtractResult;
use crate::utils::text::non_empty;

/// Source attributes checked on every element by the tree searches.
pub const SOURCE_ATTRIBUTES: &[&str] = &[
    "data-latex",
    "data-tex",
    "data-math",
    "data-formula",
    "data-katex",
    "data-original",
];

/// First attribute from `names` with a non-blank value, trimmed.
pub fn first_attribute(node: Node<'_>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| node.attr(name).and_then(non_empty))
}

/// First attribute from `names` whose raw value satisfies `accept`.
pub fn first_attribute_where(
    node: Node<'_>,
    names: &[&str],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    names
        .iter()
        .filter_map(|name| node.attr(name))
        .find(|value| accept(value))
        .and_then(non_empty)
}

/// Trimmed text of the first element under `node` matching `selector` whose
/// text is not blank.
pub fn first_text(node: Node<'_>, selector: &str) -> ExtractResult<Option<String>> {
    let selector = parse_selector(selector)?;
    Ok(node
        .select(&selector)
        .into_iter()
        .find_map(|n| non_empty(&n.text())))
}

/// Trimmed text of the first `annotation` under `node`.
pub fn annotation_text(node: Node<'_>) -> ExtractResult<Option<String>> {
    first_text(node, "annotation")
}

/// Hidden by inline `display:none`, the `hidden` attribute or the `sr-only`
/// utility class.
pub fn is_visually_hidden(node: Node<'_>) -> bool {
    node.style("display").as_deref() == Some("none")
        || node.has_attr("hidden")
        || node.has_class("sr-only")
}

/// Contains a backslash or one of `keywords`.
pub fn mentions_source(text: &str, keywords: &[&str]) -> bool {
    text.contains('\\') || keywords.iter().any(|k| text.contains(k))
}
