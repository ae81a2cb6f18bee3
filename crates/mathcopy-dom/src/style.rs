//! Inline `style` attribute helpers.

/// Look up `property` in an inline style declaration list.
pub(crate) fn inline_property(style: &str, property: &str) -> Option<String> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| value.trim().to_ascii_lowercase())
        .last()
}

/// Parse a length in `em` (unitless numbers are accepted too).
pub fn parse_em(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("em").unwrap_or(value);
    number.trim().parse().ok()
}
