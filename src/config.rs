//! Extraction configuration.
//!
//! Everything has a default, so an empty TOML file (or none at all) is a
//! valid configuration. The page hostname is the only value that normally
//! changes between runs; `MATHCOPY_HOSTNAME` overrides it.

use serde::{Deserialize, Serialize};

use crate::utils::error::ExtractResult;

/// Environment variable that overrides [`ExtractorConfig::hostname`].
pub const HOSTNAME_ENV: &str = "MATHCOPY_HOSTNAME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Hostname of the page being scanned; drives platform dispatch.
    pub hostname: String,
    /// Candidates with fewer text characters are ignored.
    pub min_text_len: usize,
    /// Candidates with more text characters are ignored.
    pub max_text_len: usize,
    /// Ceiling for returning node text verbatim from simple detection.
    pub detection_max_len: usize,
    /// Tighter ceiling for the symbol pattern set.
    pub symbol_pattern_max_len: usize,
    /// Ceiling for the context pattern set.
    pub context_pattern_max_len: usize,
    /// Longer texts are not reconstructed.
    pub reconstruct_max_len: usize,
    /// Trailing-edge delay between the last mutation and the rescan.
    pub debounce_ms: u64,
    /// Scheduled scans, relative to context creation.
    pub rescan_delays_ms: Vec<u64>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            min_text_len: 2,
            max_text_len: 1000,
            detection_max_len: 500,
            symbol_pattern_max_len: 200,
            context_pattern_max_len: 300,
            reconstruct_max_len: 500,
            debounce_ms: 300,
            rescan_delays_ms: vec![0, 2000, 5000],
        }
    }
}

impl ExtractorConfig {
    pub fn for_host(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(host) = std::env::var(HOSTNAME_ENV) {
            if !host.trim().is_empty() {
                self.hostname = host.trim().to_string();
            }
        }
        self
    }

    #[cfg(feature = "config-file")]
    pub fn from_toml_str(source: &str) -> ExtractResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "config-file")]
    pub fn load(path: &std::path::Path) -> ExtractResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> ExtractResult<()> {
        if self.min_text_len > self.max_text_len {
            return Err(crate::utils::error::ExtractError::config(format!(
                "min_text_len ({}) exceeds max_text_len ({})",
                self.min_text_len, self.max_text_len
            )));
        }
        Ok(())
    }
}
