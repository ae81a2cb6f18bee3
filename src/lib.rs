//! # mathcopy
//!
//! Recover LaTeX source from math rendered into web pages by KaTeX, MathJax
//! and the chat interfaces built on them.
//!
//! Recovery is layered and best-effort. Authoritative source kept in the
//! markup (attributes, MathML annotations, MathJax scripts, platform-specific
//! places) is preferred; when the renderer kept none, LaTeX is rebuilt from
//! the rendered glyphs and KaTeX layout.
//!
//! ## Example
//!
//! ```rust
//! use mathcopy::{Document, Extractor};
//!
//! let doc = Document::parse(r#"<span class="katex" data-latex="\sum_{i=1}^n i">∑i</span>"#);
//! let node = doc.query_first(".katex").unwrap().unwrap();
//! let latex = Extractor::for_host("example.com").extract(node);
//! assert_eq!(latex.as_deref(), Some("\\sum_{i=1}^n i"));
//! ```

pub mod config;
pub mod context;
pub mod core;
pub mod utils;

pub mod wasm;

pub use mathcopy_dom::{DeepWalk, Document, DomError, Node, ShadowRoot};

pub use config::ExtractorConfig;
pub use context::{Debouncer, RescanSchedule, ScanContext};
pub use crate::core::discovery::{has_latex_source, Discovery};
pub use crate::core::extract::Extractor;
pub use crate::core::normalize::normalize;
pub use crate::core::platform::{platform_extract, Platform};
pub use crate::core::probe::{Probe, ProbeContext, ProbeStep, StandardStep};
pub use crate::core::reconstruct::Reconstructor;
pub use utils::error::{ExtractError, ExtractResult};

/// Recover LaTeX for every candidate in an HTML page.
///
/// Convenience wrapper for one-shot use: parses `html`, runs discovery from
/// `<body>` and extracts each candidate. Candidates yielding nothing are
/// skipped.
pub fn extract_all(html: &str, hostname: &str) -> Vec<String> {
    let extractor = Extractor::for_host(hostname);
    let discovery = Discovery::new(extractor.platform(), extractor.config());
    let doc = Document::parse(html);
    discovery
        .discover(&doc, doc.scan_root())
        .into_iter()
        .filter_map(|node| extractor.extract(node))
        .collect()
}

/// Reconstruct LaTeX from rendered text alone.
pub fn reconstruct_text(text: &str) -> Option<String> {
    let latex = Reconstructor::default().reconstruct(text, None);
    normalize(latex.as_deref())
}
