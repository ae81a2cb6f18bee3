//! Semantic reconstruction.
//!
//! When no source survives in the markup, LaTeX is rebuilt from what the
//! renderer left behind. Three stages run in order and the first one that
//! changes the text wins:
//!
//! - [`known`]: whole formulas recognised by their fragments,
//! - [`layout`]: KaTeX layout read from inline positioning,
//! - [`patterns`]: regex passes over the flattened text.

pub mod known;
pub mod layout;
pub mod patterns;

use mathcopy_dom::{parse_selector, Node};

use crate::config::ExtractorConfig;
use crate::utils::error::downgrade;
use crate::utils::text::clean;

/// Rendered-text to LaTeX reconstructor.
#[derive(Debug, Clone, Copy)]
pub struct Reconstructor {
    max_len: usize,
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}

impl Reconstructor {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.reconstruct_max_len)
    }

    /// Rebuild LaTeX from rendered `text`, reading `layout` where KaTeX
    /// markup is available.
    ///
    /// Returns `None` for empty or overlong input and when no stage produced
    /// anything beyond the input itself.
    pub fn reconstruct(&self, text: &str, layout: Option<Node<'_>>) -> Option<String> {
        if text.trim().is_empty() || text.chars().count() > self.max_len {
            return None;
        }
        let stripped = clean(text);

        if let Some(formula) = known::lookup(&stripped) {
            log::debug!("reconstructed known formula {}", formula.name);
            return Some(formula.latex.to_string());
        }

        if let Some(rebuilt) = layout::reconstruct(&stripped, layout) {
            return Some(rebuilt);
        }

        let rebuilt = downgrade("patterns", patterns::reconstruct(text).map(Some))?;
        (rebuilt != stripped && !rebuilt.is_empty()).then_some(rebuilt)
    }

    /// Reconstruct from a rendered node, preferring its `.katex-html` layout.
    pub fn reconstruct_node(&self, node: Node<'_>) -> Option<String> {
        let layout = if node.has_class("katex-html") {
            node
        } else {
            parse_selector(".katex-html")
                .ok()
                .and_then(|selector| node.select_first(&selector))
                .unwrap_or(node)
        };
        self.reconstruct(&layout.text(), Some(layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quadratic_from_text() {
        let r = Reconstructor::default();
        assert_eq!(
            r.reconstruct("ax2+bx+c=0", None).as_deref(),
            Some("ax^{2} + bx + c = 0")
        );
    }

    #[test]
    fn known_formulas_take_precedence() {
        let r = Reconstructor::default();
        let out = r.reconstruct("sin(x)=x−3!x3\u{200B}+5!x5\u{200B}−⋯", None).unwrap();
        assert!(out.starts_with("\\sin(x) = x - \\frac{x^3}{3!}"));
    }

    #[test]
    fn empty_and_overlong_are_rejected() {
        let r = Reconstructor::new(10);
        assert_eq!(r.reconstruct("   ", None), None);
        assert_eq!(r.reconstruct("x2+y2+z2+w2", None), None);
    }

    #[test]
    fn unchanged_text_is_not_a_reconstruction() {
        let r = Reconstructor::default();
        assert_eq!(r.reconstruct("x", None), None);
        assert_eq!(r.reconstruct(" ab ", None), None);
    }
}
