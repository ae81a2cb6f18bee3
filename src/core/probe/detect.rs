//! Text-only LaTeX detection.
//!
//! The last probe step: decide from a node's text alone whether it already is
//! (or passes for) LaTeX source, without rewriting anything.

use lazy_static::lazy_static;

use crate::config::ExtractorConfig;
use crate::core::rules::PatternSet;
use crate::utils::error::ExtractResult;

/// Command names whose presence alone marks a string as LaTeX.
const NAMED_MACROS: &[&str] = &[
    "\\frac", "\\sum", "\\int", "\\sqrt", "\\alpha", "\\beta", "\\gamma",
];

/// LaTeX syntax: commands, groups, scripts and common constructs.
const STRUCTURAL: &[&str] = &[
    r"\\[a-zA-Z]+",
    r"\{[^}]*\}",
    r"\^\{?[^}]*\}?",
    r"_\{?[^}]*\}?",
    r"\\frac\{[^}]*\}\{[^}]*\}",
    r"\\sum_\{[^}]*\}\^\{[^}]*\}",
    r"\\int_\{[^}]*\}\^\{[^}]*\}",
    r"\\sqrt\{[^}]*\}",
    r"\\[a-z]+\{[^}]*\}",
];

/// Rendered math glyphs and shapes.
const SYMBOLS: &[&str] = &[
    r"[α-ωΑ-Ω]",
    r"[∑∏∫∂∇∆]",
    r"[≤≥≠≈≡]",
    r"[∞±∓]",
    r"\d+!",
    r"[xyz]\^[0-9]+",
    r"[xyz]_[0-9]+",
    r"\([^)]*\).*=",
    r"[A-Z]\([^)]*\)",
];

/// Arithmetic or grouping characters that must accompany a symbol match.
const MATH_STRUCTURE: &str = r"[=+\-*/^_{}()]";

/// Formula families recognised by context.
const CONTEXT: &[&str] = &[
    r"[PCSV]\([^)]*\).*=",
    r"d_?[12].*=",
    r"[xyz].*=.*±.*sqrt",
    r"ln\([^)]*\)",
    r"log_?\d*\([^)]*\)",
    r"sin|cos|tan|sec|csc|cot",
    r"sinh|cosh|tanh",
    r"lim.*→",
    r"\d+!.*[xyz]",
];

struct DetectionPatterns {
    structural: PatternSet,
    symbols: PatternSet,
    math_structure: PatternSet,
    context: PatternSet,
}

impl DetectionPatterns {
    fn compile() -> ExtractResult<Self> {
        Ok(Self {
            structural: PatternSet::compile(STRUCTURAL)?,
            symbols: PatternSet::compile(SYMBOLS)?,
            math_structure: PatternSet::compile(&[MATH_STRUCTURE])?,
            context: PatternSet::compile(CONTEXT)?,
        })
    }
}

lazy_static! {
    static ref PATTERNS: ExtractResult<DetectionPatterns> = DetectionPatterns::compile();
}

/// Cheap syntactic test: a `\command`, a `{...}` pair or a named macro.
pub fn is_likely_latex(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let has_command = text
        .split('\\')
        .skip(1)
        .any(|rest| rest.starts_with(|c: char| c.is_ascii_alphabetic()));
    if has_command {
        return true;
    }
    if text.contains('{') && text.contains('}') {
        return true;
    }
    NAMED_MACROS.iter().any(|m| text.contains(m))
}

/// `\` together with `frac`, `sum` or `int`.
pub fn has_source_markers(text: &str) -> bool {
    text.contains('\\') && ["frac", "sum", "int"].iter().any(|k| text.contains(k))
}

/// Return the trimmed text if it passes for LaTeX under the configured
/// length ceilings.
pub fn detect(text: &str, config: &ExtractorConfig) -> ExtractResult<Option<String>> {
    let len = text.chars().count();
    if text.trim().is_empty() || len > config.detection_max_len {
        return Ok(None);
    }
    let accepted = Some(text.trim().to_string());

    if is_likely_latex(text) || has_source_markers(text) {
        return Ok(accepted);
    }

    let patterns = (*PATTERNS).as_ref().map_err(Clone::clone)?;
    if patterns.structural.any_match(text) {
        return Ok(accepted);
    }
    if len < config.symbol_pattern_max_len
        && patterns.symbols.any_match(text)
        && patterns.math_structure.any_match(text)
    {
        return Ok(accepted);
    }
    if len < config.context_pattern_max_len && patterns.context.any_match(text) {
        return Ok(accepted);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_default(text: &str) -> Option<String> {
        detect(text, &ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn commands_and_groups_are_latex() {
        assert!(is_likely_latex("\\alpha + 1"));
        assert!(is_likely_latex("{a}"));
        assert!(!is_likely_latex("a \\ b"));
        assert!(!is_likely_latex(""));
    }

    #[test]
    fn structural_patterns() {
        assert_eq!(detect_default(" x^2 ").as_deref(), Some("x^2"));
        assert_eq!(detect_default("a_1").as_deref(), Some("a_1"));
    }

    #[test]
    fn symbols_need_structure() {
        assert_eq!(detect_default("α+β").as_deref(), Some("α+β"));
        assert_eq!(detect_default("α β"), None);
        assert_eq!(detect_default("f(x) = 3").as_deref(), Some("f(x) = 3"));
    }

    #[test]
    fn context_patterns() {
        assert_eq!(detect_default("lim x→0").as_deref(), Some("lim x→0"));
        assert_eq!(detect_default("cos x").as_deref(), Some("cos x"));
        assert_eq!(detect_default("ln(2)").as_deref(), Some("ln(2)"));
    }

    #[test]
    fn plain_prose_is_not_latex() {
        assert_eq!(detect_default("hello world"), None);
    }

    #[test]
    fn ceilings_apply() {
        let long = format!("x^2 {}", "a".repeat(600));
        assert_eq!(detect_default(&long), None);

        let config = ExtractorConfig {
            symbol_pattern_max_len: 3,
            ..ExtractorConfig::default()
        };
        assert_eq!(detect("α+β+γ", &config).unwrap(), None);
    }
}
