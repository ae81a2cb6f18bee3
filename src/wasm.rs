//! WASM bindings for mathcopy
//!
//! This module exposes the recovery engine to a content script: the script
//! serializes the page (or a subtree) and gets back the recovered LaTeX of
//! every candidate.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
use crate::config::ExtractorConfig;

/// One discovered candidate (exposed to WASM)
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Candidate {
    /// Lowercase tag name
    pub tag: String,
    /// Space-separated class list
    pub classes: String,
    /// Recovered LaTeX, `null` when nothing usable was found
    pub latex: Option<String>,
}

/// Extraction result with error reporting
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct ExtractOutput {
    pub candidates: Vec<Candidate>,
    pub success: bool,
    pub error: Option<String>,
}

/// Safely serialize a value to JsValue, returning an error object on failure.
#[cfg(feature = "wasm")]
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        let error_obj = ExtractOutput {
            candidates: vec![],
            success: false,
            error: Some(format!("Serialization error: {}", e)),
        };
        serde_wasm_bindgen::to_value(&error_obj).unwrap_or(JsValue::NULL)
    })
}

// Discovery and extraction only: the rescan schedule is driven from JS.
#[cfg(feature = "wasm")]
fn candidates(html: &str, config: ExtractorConfig) -> Vec<Candidate> {
    let doc = crate::Document::parse(html);
    let extractor = crate::Extractor::new(config);
    let discovery = crate::Discovery::new(extractor.platform(), extractor.config());
    discovery
        .discover(&doc, doc.scan_root())
        .into_iter()
        .map(|node| Candidate {
            tag: node.tag().to_string(),
            classes: node.class_name(),
            latex: extractor.extract(node),
        })
        .collect()
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Recover LaTeX from every candidate in an HTML page
///
/// # Arguments
/// * `html` - Serialized page or subtree
/// * `hostname` - Page hostname (selects the platform strategy)
///
/// # Returns
/// Array of `{ tag, classes, latex }`
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "extractFromHtml")]
pub fn extract_from_html(html: &str, hostname: &str) -> JsValue {
    to_js_value(&candidates(html, ExtractorConfig::for_host(hostname)))
}

/// Recover LaTeX with a full configuration object
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "extractWithConfig")]
pub fn extract_with_config(html: &str, config: JsValue) -> JsValue {
    let config: ExtractorConfig = match serde_wasm_bindgen::from_value(config) {
        Ok(config) => config,
        Err(e) => {
            return to_js_value(&ExtractOutput {
                candidates: vec![],
                success: false,
                error: Some(format!("Invalid config: {}", e)),
            })
        }
    };
    if let Err(e) = config.validate() {
        return to_js_value(&ExtractOutput {
            candidates: vec![],
            success: false,
            error: Some(e.to_string()),
        });
    }
    to_js_value(&ExtractOutput {
        candidates: candidates(html, config),
        success: true,
        error: None,
    })
}

/// Reconstruct LaTeX from rendered math text
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "reconstructText")]
pub fn reconstruct_text(text: &str) -> Option<String> {
    crate::reconstruct_text(text)
}

/// Strip delimiters and reject non-math strings
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "normalizeLatex")]
pub fn normalize_latex(text: &str) -> Option<String> {
    crate::normalize(Some(text))
}

/// Get version information
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
