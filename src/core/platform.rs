//! Host platform dispatch.
//!
//! Each supported chat interface keeps LaTeX source in its own places. The
//! platform is chosen once per page from the hostname by an ordered table of
//! substring matches; its strategy is a pure function of the candidate node.

use std::fmt;

use mathcopy_dom::{parse_selector, Node};

use super::lookup::{
    annotation_text, first_attribute, first_attribute_where, first_text, is_visually_hidden,
    mentions_source, SOURCE_ATTRIBUTES,
};
use super::probe::detect::is_likely_latex;
use crate::utils::error::ExtractResult;
use crate::utils::text::non_empty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Gemini,
    Kimi,
    DeepSeek,
    ChatGpt,
    Claude,
    Generic,
}

/// Hostname substrings in match order.
const HOSTS: &[(&str, Platform)] = &[
    ("gemini.google.com", Platform::Gemini),
    ("kimi.ai", Platform::Kimi),
    ("kimi.moonshot.cn", Platform::Kimi),
    ("chat.deepseek.com", Platform::DeepSeek),
    ("chat.openai.com", Platform::ChatGpt),
    ("chatgpt.com", Platform::ChatGpt),
    ("claude.ai", Platform::Claude),
];

/// Containers Gemini wraps its KaTeX output in.
const GEMINI_SELECTORS: &[&str] = &[
    ".math-inline",
    ".math-block",
    ".katex",
    ".katex-html",
    ".katex-display",
];

/// Everything else: KaTeX, MathJax, MathML and the source-attribute markers
/// used across chat interfaces.
const GENERIC_SELECTORS: &[&str] = &[
    // KaTeX
    ".katex",
    ".katex-html",
    ".katex-display",
    ".katex-inline",
    ".katex-mathml",
    // MathJax
    ".MathJax",
    ".mjx-container",
    ".mjx-chtml",
    ".MathJax_Display",
    "mjx-math",
    ".mjx-assistive-mml",
    ".mjx-mrow",
    ".mjx-math",
    // Generic math markup
    "math",
    ".math",
    ".formula",
    ".equation",
    ".math-expression",
    // Source attributes
    "[data-latex]",
    "[data-math]",
    "[data-katex]",
    "[data-mathjax]",
    "[data-tex]",
    "[data-formula]",
    "[data-equation]",
    "[data-math-content]",
    // Platform containers
    ".ds-math",
    ".formula-box",
    ".math-container",
    ".latex-container",
    ".math-block",
    ".math-inline",
    ".latex-block",
    ".latex-inline",
    ".latex-source",
    ".math-display",
    ".inline-math",
    ".math-tex",
    ".katex-display-wrapper",
    "katex-html",
    ".formula-wrapper",
    ".equation-wrapper",
    ".math-wrapper",
];

impl Platform {
    /// Platform for `hostname`; [`Platform::Generic`] when nothing matches.
    pub fn detect(hostname: &str) -> Self {
        let hostname = hostname.to_ascii_lowercase();
        HOSTS
            .iter()
            .find(|(needle, _)| hostname.contains(needle))
            .map(|(_, platform)| *platform)
            .unwrap_or(Platform::Generic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Gemini => "gemini",
            Platform::Kimi => "kimi",
            Platform::DeepSeek => "deepseek",
            Platform::ChatGpt => "chatgpt",
            Platform::Claude => "claude",
            Platform::Generic => "generic",
        }
    }

    /// The renderer emits layout only; node text is never source.
    pub fn renders_without_source(&self) -> bool {
        matches!(self, Platform::Gemini)
    }

    /// Selectors discovery enumerates on this platform.
    pub fn math_selectors(&self) -> &'static [&'static str] {
        match self {
            Platform::Gemini => GEMINI_SELECTORS,
            _ => GENERIC_SELECTORS,
        }
    }

    /// Run the platform strategy on `node`.
    pub fn extract(&self, node: Node<'_>) -> ExtractResult<Option<String>> {
        match self {
            Platform::Gemini => gemini(node),
            Platform::Kimi => kimi(node),
            Platform::DeepSeek => deepseek(node),
            Platform::ChatGpt => chatgpt(node),
            Platform::Claude => Ok(first_attribute(node, &["data-math-content"])),
            Platform::Generic => Ok(None),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detect the platform for `hostname` and run its strategy.
pub fn platform_extract(node: Node<'_>, hostname: &str) -> ExtractResult<Option<String>> {
    Platform::detect(hostname).extract(node)
}

// =============================================================================
// Strategies
// =============================================================================

fn gemini(node: Node<'_>) -> ExtractResult<Option<String>> {
    // Hidden source left next to the layout
    let hidden = node
        .descendants()
        .into_iter()
        .filter(|n| is_visually_hidden(*n))
        .find_map(|n| non_empty(&n.text()).filter(|t| mentions_source(t, &["frac", "sum"])));
    if hidden.is_some() {
        return Ok(hidden);
    }

    let labelled = first_attribute_where(
        node,
        &["data-latex", "data-math", "data-formula", "title", "aria-label"],
        |v| mentions_source(v, &["frac"]),
    );
    if labelled.is_some() {
        return Ok(labelled);
    }

    let original = first_attribute_where(
        node,
        &["data-original", "data-source", "data-raw", "data-tex-source"],
        |v| v.contains('\\'),
    );
    if original.is_some() {
        return Ok(original);
    }

    for element in std::iter::once(node).chain(node.descendants()) {
        if let Some(source) = first_attribute(element, SOURCE_ATTRIBUTES) {
            return Ok(Some(source));
        }
        if let Some(annotation) = annotation_text(element)? {
            return Ok(Some(annotation));
        }
        if let Some(text) = non_empty(&element.text()).filter(|t| is_likely_latex(t)) {
            return Ok(Some(text));
        }
    }
    Ok(None)
}

fn kimi(node: Node<'_>) -> ExtractResult<Option<String>> {
    if let Some(latex) = first_attribute(node, &["data-latex"]) {
        return Ok(Some(latex));
    }
    first_text(node, ".latex-source, [data-math]")
}

fn deepseek(node: Node<'_>) -> ExtractResult<Option<String>> {
    if let Some(latex) = first_attribute(node, &["data-katex", "data-formula", "data-tex"]) {
        return Ok(Some(latex));
    }
    if node.has_class("katex") || node.has_class("ds-math") {
        return annotation_text(node);
    }
    Ok(None)
}

fn chatgpt(node: Node<'_>) -> ExtractResult<Option<String>> {
    if let Some(script) = first_text(node, r#"script[type*="math/tex"]"#)? {
        return Ok(Some(script));
    }
    let math = parse_selector(".math")?;
    match node.closest(&math) {
        Some(container) => first_text(container, r#"script[type="math/tex"]"#),
        None => Ok(None),
    }
}
