//! Candidate normalization.
//!
//! Every recovered string passes through [`normalize`] before it reaches the
//! caller: zero-width characters and math delimiters are stripped and strings
//! that do not look like math are rejected.

use super::symbols;
use crate::utils::text::clean;

/// Delimiter pairs, longest first so `$$` wins over `$`.
const DELIMITERS: &[(&str, &str)] = &[("$$", "$$"), ("\\[", "\\]"), ("\\(", "\\)"), ("$", "$")];

/// Characters that give a short string a math shape.
const STRUCTURE: &str = "^_{}=+-*/<>|()[]!";

/// Clean a candidate LaTeX string. Idempotent.
pub fn normalize(candidate: Option<&str>) -> Option<String> {
    let mut current = clean(candidate?);
    while let Some(inner) = strip_delimiters(&current) {
        current = clean(inner);
    }
    if current.is_empty() || !has_math_shape(&current) {
        return None;
    }
    Some(current)
}

/// Inner text of one enclosing delimiter pair, unless the closing delimiter
/// also occurs inside (`$a$ + $b$` is two formulas, not one).
fn strip_delimiters(text: &str) -> Option<&str> {
    DELIMITERS.iter().find_map(|(open, close)| {
        if text.len() < open.len() + close.len() {
            return None;
        }
        let inner = text.strip_prefix(open)?.strip_suffix(close)?;
        if inner.contains(close) {
            return None;
        }
        Some(inner)
    })
}

/// Shape check applied after stripping.
pub fn has_math_shape(text: &str) -> bool {
    text.contains('\\')
        || text.chars().count() <= 4
        || text
            .chars()
            .any(|c| STRUCTURE.contains(c) || c.is_ascii_digit() || symbols::lookup(c).is_some())
}
