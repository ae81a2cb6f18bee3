//! Element discovery and dedup.
//!
//! Finds the rendered-math candidates of a page: elements matching the
//! platform's selector set, in layered shadow-crossing order. Every node
//! returned is marked processed on its document and never returned again.

use mathcopy_dom::{parse_selector, DeepWalk, Document, Node, Selector};

use crate::config::ExtractorConfig;
use crate::core::platform::Platform;
use crate::core::probe::has_source_markers;

/// Tags whose text is never rendered math.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

#[derive(Debug, Clone)]
pub struct Discovery {
    platform: Platform,
    min_text_len: usize,
    max_text_len: usize,
    selectors: Vec<String>,
}

impl Discovery {
    pub fn new(platform: Platform, config: &ExtractorConfig) -> Self {
        Self {
            platform,
            min_text_len: config.min_text_len,
            max_text_len: config.max_text_len,
            selectors: platform
                .math_selectors()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Replace the selector set.
    pub fn with_selectors<S: Into<String>>(mut self, selectors: impl IntoIterator<Item = S>) -> Self {
        self.selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Unprocessed candidates under `root`, marked processed on return.
    pub fn discover<'a>(&self, doc: &'a Document, root: Node<'a>) -> Vec<Node<'a>> {
        let selectors = self.compiled_selectors();
        let walk = DeepWalk::new(root).including_root();

        let mut candidates: Vec<Node<'a>> = walk
            .select_any(&selectors)
            .into_iter()
            .filter(|n| self.is_candidate(doc, *n))
            .collect();

        if !self.platform.renders_without_source() {
            candidates.retain(|n| has_latex_source(*n, self.platform));
            if candidates.is_empty() {
                candidates = self.innermost_sources(doc, &walk);
            }
        }

        candidates.retain(|n| doc.mark_processed(*n));
        log::debug!(
            "discovered {} candidate(s) on {} under {}",
            candidates.len(),
            self.platform,
            root.describe()
        );
        candidates
    }

    fn compiled_selectors(&self) -> Vec<Selector> {
        self.selectors
            .iter()
            .filter_map(|source| match parse_selector(source) {
                Ok(selector) => Some(selector),
                Err(err) => {
                    log::warn!("ignoring selector: {}", err);
                    None
                }
            })
            .collect()
    }

    fn is_candidate(&self, doc: &Document, node: Node<'_>) -> bool {
        if doc.is_processed(node) || SKIPPED_TAGS.contains(&node.tag()) {
            return false;
        }
        let len = node.text().trim().chars().count();
        if len < self.min_text_len || len > self.max_text_len {
            return false;
        }
        node.is_rendered()
    }

    /// Elements carrying source none of whose descendants also carry it.
    fn innermost_sources<'a>(&self, doc: &Document, walk: &DeepWalk<'a>) -> Vec<Node<'a>> {
        walk.elements()
            .into_iter()
            .filter(|n| self.is_candidate(doc, *n))
            .filter(|n| has_latex_source(*n, self.platform))
            .filter(|n| {
                !n.descendants()
                    .into_iter()
                    .any(|d| has_latex_source(d, self.platform))
            })
            .collect()
    }
}

/// Whether `node` carries recoverable LaTeX on `platform`.
pub fn has_latex_source(node: Node<'_>, platform: Platform) -> bool {
    if platform.renders_without_source() {
        return ["math-inline", "math-block", "katex"]
            .iter()
            .any(|c| node.has_class(c))
            || node.descendants().iter().any(|d| d.has_class("katex"));
    }

    if node.has_attr("data-latex") || node.has_attr("data-math") {
        return true;
    }
    let marked = node.descendants().into_iter().any(|d| {
        d.tag() == "annotation"
            || (d.tag() == "script" && d.attr("type").is_some_and(|t| t.contains("math")))
    });
    if marked {
        return true;
    }
    if node.tag() == "img" && node.attr("alt").is_some_and(|alt| !alt.trim().is_empty()) {
        return true;
    }
    has_source_markers(&node.text())
}
