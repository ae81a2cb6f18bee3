//! Structural probe.
//!
//! The probe is an ordered list of steps. Each step looks for authoritative
//! LaTeX source in one place (an attribute, a MathML annotation, a MathJax
//! script, a platform-specific location...) and the first non-empty answer
//! wins. A step that fails is logged and treated as having found nothing.

pub mod detect;
mod nested;
mod steps;

pub use detect::{has_source_markers, is_likely_latex};
pub use steps::StandardStep;

use mathcopy_dom::Node;

use crate::config::ExtractorConfig;
use crate::core::platform::Platform;
use crate::utils::error::{downgrade, ExtractResult};

/// What a step may consult besides the node.
#[derive(Debug, Clone, Copy)]
pub struct ProbeContext<'c> {
    pub platform: Platform,
    pub config: &'c ExtractorConfig,
}

impl<'c> ProbeContext<'c> {
    pub fn new(config: &'c ExtractorConfig) -> Self {
        Self {
            platform: Platform::detect(&config.hostname),
            config,
        }
    }
}

/// One source lookup in the cascade.
pub trait ProbeStep {
    fn name(&self) -> &'static str;

    fn probe(&self, node: Node<'_>, ctx: &ProbeContext<'_>) -> ExtractResult<Option<String>>;
}

/// The ordered cascade.
pub struct Probe {
    steps: Vec<Box<dyn ProbeStep>>,
}

impl Probe {
    /// All standard steps in priority order.
    pub fn standard() -> Self {
        Self::from_standard(StandardStep::ALL)
    }

    /// Standard steps minus those that cannot apply on `platform`. Text
    /// detection is dropped where the rendered text is never source.
    pub fn for_platform(platform: Platform) -> Self {
        if platform.renders_without_source() {
            let steps: Vec<_> = StandardStep::ALL
                .iter()
                .copied()
                .filter(|s| *s != StandardStep::SimpleDetection)
                .collect();
            return Self::from_standard(&steps);
        }
        Self::standard()
    }

    pub fn with_steps(steps: Vec<Box<dyn ProbeStep>>) -> Self {
        Self { steps }
    }

    fn from_standard(steps: &[StandardStep]) -> Self {
        Self {
            steps: steps
                .iter()
                .map(|s| Box::new(*s) as Box<dyn ProbeStep>)
                .collect(),
        }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// First non-blank result of the cascade.
    pub fn run(&self, node: Node<'_>, ctx: &ProbeContext<'_>) -> Option<String> {
        for step in &self.steps {
            let found = downgrade(step.name(), step.probe(node, ctx))
                .filter(|latex| !latex.trim().is_empty());
            if let Some(latex) = found {
                log::debug!("{}: {} found {:?}", node.describe(), step.name(), latex);
                return Some(latex);
            }
        }
        log::debug!("{}: no source found", node.describe());
        None
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.step_names()).finish()
    }
}
