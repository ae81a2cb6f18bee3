use mathcopy_dom::{parse_selector, Node};

use super::{detect, nested, ProbeContext, ProbeStep};
use crate::core::lookup::first_attribute;
use crate::utils::error::ExtractResult;
use crate::utils::text::non_empty;

/// The built-in steps, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardStep {
    SourceAttribute,
    Annotation,
    ImageAlt,
    Platform,
    MathScript,
    Nested,
    AlternateAttributes,
    SimpleDetection,
}

impl StandardStep {
    pub const ALL: &'static [StandardStep] = &[
        StandardStep::SourceAttribute,
        StandardStep::Annotation,
        StandardStep::ImageAlt,
        StandardStep::Platform,
        StandardStep::MathScript,
        StandardStep::Nested,
        StandardStep::AlternateAttributes,
        StandardStep::SimpleDetection,
    ];
}

impl ProbeStep for StandardStep {
    fn name(&self) -> &'static str {
        match self {
            StandardStep::SourceAttribute => "source-attribute",
            StandardStep::Annotation => "annotation",
            StandardStep::ImageAlt => "image-alt",
            StandardStep::Platform => "platform",
            StandardStep::MathScript => "math-script",
            StandardStep::Nested => "nested",
            StandardStep::AlternateAttributes => "alternate-attributes",
            StandardStep::SimpleDetection => "simple-detection",
        }
    }

    fn probe(&self, node: Node<'_>, ctx: &ProbeContext<'_>) -> ExtractResult<Option<String>> {
        match self {
            StandardStep::SourceAttribute => Ok(source_attribute(node)),
            StandardStep::Annotation => annotation(node),
            StandardStep::ImageAlt => Ok(image_alt(node)),
            StandardStep::Platform => ctx.platform.extract(node),
            StandardStep::MathScript => math_script(node),
            StandardStep::Nested => nested::probe(node),
            StandardStep::AlternateAttributes => Ok(first_attribute(
                node,
                &[
                    "data-katex",
                    "data-formula",
                    "data-tex",
                    "data-math-content",
                    "data-original-latex",
                ],
            )),
            StandardStep::SimpleDetection => detect::detect(&node.text(), ctx.config),
        }
    }
}

/// `data-latex`, then `data-katex-source`, verbatim.
fn source_attribute(node: Node<'_>) -> Option<String> {
    ["data-latex", "data-katex-source"]
        .iter()
        .filter_map(|name| node.attr(name))
        .find(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// A TeX-encoded annotation if there is one, else any annotation with text.
fn annotation(node: Node<'_>) -> ExtractResult<Option<String>> {
    let selector = parse_selector("annotation")?;
    let annotations = node.select(&selector);
    let is_tex = |n: &Node<'_>| {
        n.attr("encoding").is_some_and(|encoding| {
            let encoding = encoding.to_ascii_lowercase();
            encoding.contains("tex") || encoding.contains("latex")
        })
    };
    let texts = |tex_only: bool| {
        annotations
            .iter()
            .filter(|n| !tex_only || is_tex(*n))
            .find_map(|n| non_empty(&n.text()))
    };
    Ok(texts(true).or_else(|| texts(false)))
}

fn image_alt(node: Node<'_>) -> Option<String> {
    if node.tag() != "img" {
        return None;
    }
    node.attr("alt").and_then(non_empty)
}

/// MathJax v2 keeps the source in `<script type="math/tex">` next to the
/// rendered output, so ancestors are searched too (up to `body`).
fn math_script(node: Node<'_>) -> ExtractResult<Option<String>> {
    let own = parse_selector(
        r#"script[type*="math/tex"], script[type*="math/mml"], script[type*="math/asciimath"]"#,
    )?;
    let tex = parse_selector(r#"script[type*="math/tex"]"#)?;

    let found = node
        .select(&own)
        .into_iter()
        .find_map(|script| non_empty(&script.text()));
    if found.is_some() {
        return Ok(found);
    }

    Ok(node
        .ancestors()
        .into_iter()
        .take_while(|ancestor| ancestor.tag() != "body")
        .find_map(|ancestor| {
            ancestor
                .select(&tex)
                .into_iter()
                .find_map(|script| non_empty(&script.text()))
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use mathcopy_dom::Document;
    use pretty_assertions::assert_eq;

    fn run(step: StandardStep, html: &str) -> Option<String> {
        let doc = Document::parse(html);
        let node = doc.query_first("#t").unwrap().unwrap();
        let config = ExtractorConfig::default();
        step.probe(node, &ProbeContext::new(&config)).unwrap()
    }

    #[test]
    fn source_attribute_is_verbatim() {
        assert_eq!(
            run(StandardStep::SourceAttribute, r#"<span id="t" data-latex=" a + b "></span>"#)
                .as_deref(),
            Some(" a + b ")
        );
        assert_eq!(
            run(
                StandardStep::SourceAttribute,
                r#"<span id="t" data-latex="" data-katex-source="y"></span>"#
            )
            .as_deref(),
            Some("y")
        );
    }

    #[test]
    fn tex_annotation_is_preferred() {
        let html = r#"<span id="t"><math><semantics>
            <annotation encoding="text/plain">plain</annotation>
            <annotation encoding="application/x-TeX">x^2</annotation>
        </semantics></math></span>"#;
        assert_eq!(run(StandardStep::Annotation, html).as_deref(), Some("x^2"));
    }

    #[test]
    fn any_annotation_as_fallback() {
        let html = r#"<span id="t"><math><annotation>  y_1 </annotation></math></span>"#;
        assert_eq!(run(StandardStep::Annotation, html).as_deref(), Some("y_1"));
    }

    #[test]
    fn image_alt_only_on_images() {
        assert_eq!(
            run(StandardStep::ImageAlt, r#"<img id="t" alt=" E=mc^2 ">"#).as_deref(),
            Some("E=mc^2")
        );
        assert_eq!(
            run(StandardStep::ImageAlt, r#"<span id="t" alt="E=mc^2"></span>"#),
            None
        );
    }

    #[test]
    fn math_script_searches_ancestors() {
        let html = r#"<div><script type="math/tex; mode=display">\sum_i i</script><p><span id="t">∑i</span></p></div>"#;
        assert_eq!(
            run(StandardStep::MathScript, html).as_deref(),
            Some("\\sum_i i")
        );
    }

    #[test]
    fn math_script_stops_at_body() {
        let html = r#"<body><script type="math/tex">x</script><span id="t">x</span></body>"#;
        assert_eq!(run(StandardStep::MathScript, html), None);
    }

    #[test]
    fn alternate_attributes() {
        assert_eq!(
            run(
                StandardStep::AlternateAttributes,
                r#"<span id="t" data-original-latex="\gamma"></span>"#
            )
            .as_deref(),
            Some("\\gamma")
        );
    }

    #[test]
    fn simple_detection_reads_text() {
        assert_eq!(
            run(StandardStep::SimpleDetection, r#"<span id="t"> \frac{1}{2} </span>"#).as_deref(),
            Some("\\frac{1}{2}")
        );
    }
}
