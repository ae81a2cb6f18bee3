//! Source hidden deeper in the subtree, including open shadow roots.

use mathcopy_dom::{parse_selector, DeepWalk, Node};

use crate::core::lookup::{
    annotation_text, first_attribute, is_visually_hidden, mentions_source, SOURCE_ATTRIBUTES,
};
use crate::utils::error::ExtractResult;
use crate::utils::text::non_empty;

const MARKED: &str = ".katex annotation, [data-latex], [data-tex], [data-math]";
const MARKER_ATTRIBUTES: &[&str] = &["data-latex", "data-tex", "data-math"];
const SOURCE_CLASSES: &[&str] = &["latex-source", "math-source", "katex-source", "formula-source"];

pub(super) fn probe(node: Node<'_>) -> ExtractResult<Option<String>> {
    if let Some(found) = marked_elements(node)? {
        return Ok(Some(found));
    }
    light_descendants(node)
}

/// Annotations and source-attributed elements, across shadow boundaries.
fn marked_elements(node: Node<'_>) -> ExtractResult<Option<String>> {
    let selector = parse_selector(MARKED)?;
    Ok(DeepWalk::new(node)
        .select(&selector)
        .into_iter()
        .find_map(|element| {
            if element.tag() == "annotation" {
                non_empty(&element.text())
            } else {
                first_attribute(element, MARKER_ATTRIBUTES)
            }
        }))
}

fn light_descendants(node: Node<'_>) -> ExtractResult<Option<String>> {
    for child in node.descendants() {
        if let Some(value) = first_attribute(child, SOURCE_ATTRIBUTES) {
            return Ok(Some(value));
        }
        if let Some(annotation) = annotation_text(child)? {
            return Ok(Some(annotation));
        }

        let source_class = SOURCE_CLASSES.iter().any(|c| child.has_class(c));
        if source_class || child.has_attr("data-math") {
            let text = non_empty(&child.text()).filter(|t| mentions_source(t, &["frac", "sum"]));
            if text.is_some() {
                return Ok(text);
            }
        }

        if is_visually_hidden(child) {
            let text = non_empty(&child.text()).filter(|t| mentions_source(t, &["frac"]));
            if text.is_some() {
                return Ok(text);
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathcopy_dom::Document;
    use pretty_assertions::assert_eq;

    fn nested(html: &str) -> Option<String> {
        let doc = Document::parse(html);
        let node = doc.query_first("#t").unwrap().unwrap();
        probe(node).unwrap()
    }

    #[test]
    fn finds_source_inside_shadow_root() {
        let html = r#"<div id="t"><math-view><template shadowrootmode="open"><span data-tex="\pi r^2">πr2</span></template></math-view></div>"#;
        assert_eq!(nested(html).as_deref(), Some("\\pi r^2"));
    }

    #[test]
    fn closed_shadow_root_is_not_read() {
        let html = r#"<div id="t"><math-view><template shadowrootmode="closed"><span data-tex="x">x</span></template></math-view></div>"#;
        assert_eq!(nested(html), None);
    }

    #[test]
    fn katex_annotation_text() {
        let html = r#"<div id="t"><span class="katex"><math><annotation encoding="application/x-tex">a^2</annotation></math></span></div>"#;
        assert_eq!(nested(html).as_deref(), Some("a^2"));
    }

    #[test]
    fn descendant_source_attributes() {
        let html = r#"<div id="t"><span><b data-original=" \sqrt{2} "></b></span></div>"#;
        assert_eq!(nested(html).as_deref(), Some("\\sqrt{2}"));
    }

    #[test]
    fn source_class_needs_latex_text() {
        let html = r#"<div id="t"><pre class="latex-source">hello</pre><pre class="math-source">\sum_i x_i</pre></div>"#;
        assert_eq!(nested(html).as_deref(), Some("\\sum_i x_i"));
    }

    #[test]
    fn visually_hidden_copy() {
        let html = r#"<div id="t"><span class="sr-only">frac12</span><span>½</span></div>"#;
        assert_eq!(nested(html).as_deref(), Some("frac12"));
    }
}
