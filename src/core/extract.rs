//! The single extraction entry point: probe, then reconstruct, then
//! normalize.

use mathcopy_dom::Node;

use super::normalize::normalize;
use super::platform::Platform;
use super::probe::{Probe, ProbeContext};
use super::reconstruct::Reconstructor;
use crate::config::ExtractorConfig;

#[derive(Debug)]
pub struct Extractor {
    config: ExtractorConfig,
    platform: Platform,
    probe: Probe,
    reconstructor: Reconstructor,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let platform = Platform::detect(&config.hostname);
        Self {
            probe: Probe::for_platform(platform),
            reconstructor: Reconstructor::from_config(&config),
            platform,
            config,
        }
    }

    pub fn for_host(hostname: &str) -> Self {
        Self::new(ExtractorConfig::for_host(hostname))
    }

    /// Swap the probe cascade.
    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    pub fn reconstructor(&self) -> &Reconstructor {
        &self.reconstructor
    }

    /// LaTeX for `node`, or `None` when nothing usable was recovered.
    pub fn extract(&self, node: Node<'_>) -> Option<String> {
        let ctx = ProbeContext {
            platform: self.platform,
            config: &self.config,
        };
        let candidate = self.probe.run(node, &ctx).or_else(|| {
            log::debug!("{}: reconstructing from rendered text", node.describe());
            self.reconstructor.reconstruct_node(node)
        });
        normalize(candidate.as_deref())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathcopy_dom::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn probe_result_is_normalized() {
        let doc = Document::parse(r#"<span id="t" data-latex="$\alpha$">α</span>"#);
        let node = doc.query_first("#t").unwrap().unwrap();
        assert_eq!(Extractor::default().extract(node).as_deref(), Some("\\alpha"));
    }

    #[test]
    fn falls_back_to_reconstruction() {
        let doc = Document::parse(r#"<span id="t" class="katex"><span class="katex-html">x2+y2</span></span>"#);
        let node = doc.query_first("#t").unwrap().unwrap();
        let extractor = Extractor::for_host("gemini.google.com");
        assert_eq!(extractor.extract(node).as_deref(), Some("x^{2} + y^{2}"));
    }

    #[test]
    fn prose_is_rejected() {
        let doc = Document::parse(r#"<p id="t">just some words</p>"#);
        let node = doc.query_first("#t").unwrap().unwrap();
        assert_eq!(Extractor::default().extract(node), None);
    }
}
