//! Reconstruction from KaTeX layout markup.
//!
//! KaTeX positions fraction parts, scripts and operator limits with vertical
//! lists: stacked rows whose inline `top` offset (in em) places them on the
//! page. Reading those offsets recovers which rendered run was a numerator,
//! a superscript or an upper limit. These rules track one renderer's private
//! markup and stay best-effort: a rule that cannot read the layout leaves the
//! text alone.

use lazy_static::lazy_static;
use mathcopy_dom::{parse_em, parse_selector, Node};
use regex::{NoExpand, Regex};

use crate::core::rules::{is_letter, replace_unless_followed_by, CompiledRule, Rule};
use crate::core::symbols::map_glyphs;
use crate::utils::error::{ExtractError, ExtractResult};
use crate::utils::text::clean;

/// Height KaTeX gives a script row's strut when none is declared.
const DEFAULT_STRUT_EM: f32 = 2.7;

/// Operators whose limits are laid out as scripts or stacked rows.
const LARGE_OPERATORS: &[&str] = &["∫", "∬", "∭", "∮", "∑", "∏"];

/// Conditional probability rendered as a run of `P(..)` factors.
const BAYES: Rule = Rule::new(
    "bayes",
    r"P\(([^)∣|]+)[∣|]([^)]+)\).*?P\(([^)]+)\)P\(([^)]+)\).*?P\(([^)]+)\)",
    r"P(${1}|${2}) = \frac{P(${2}|${1})P(${1})}{P(${2})}",
);

lazy_static! {
    static ref BAYES_RULE: ExtractResult<CompiledRule> = BAYES.compile();
}

/// Apply the layout rules in order (fraction, scripts, root, large
/// operator) to `text`, which must already be free of zero-width
/// characters. Returns `None` when nothing changed.
pub fn reconstruct(text: &str, layout: Option<Node<'_>>) -> Option<String> {
    let mut current = text.to_string();

    if let Some(layout) = layout {
        current = attempt("fraction", fractions(layout, &current), current);
    }
    if current == text {
        current = attempt("bayes", bayes(&current), current);
    }
    if let Some(layout) = layout {
        current = attempt("scripts", scripts(layout, &current), current);
        current = attempt("root", roots(layout, &current), current);
        current = attempt("large-operator", large_operators(layout, &current), current);
    }

    (current != text).then_some(current)
}

fn attempt(rule: &str, result: ExtractResult<String>, fallback: String) -> String {
    match result {
        Ok(rewritten) => {
            if rewritten != fallback {
                log::trace!("layout {} -> {:?}", rule, rewritten);
            }
            rewritten
        }
        Err(err) => {
            log::debug!("layout {} skipped: {}", rule, err);
            fallback
        }
    }
}

// =============================================================================
// Vertical lists
// =============================================================================

/// A positioned row of a vertical list.
#[derive(Debug)]
struct Row<'a> {
    node: Node<'a>,
    top: f32,
}

/// Rows of the first `.vlist-r > .vlist` under `node`.
fn rows(node: Node<'_>) -> ExtractResult<Vec<Row<'_>>> {
    let vlist = parse_selector(".vlist-r > .vlist")?;
    let Some(list) = node.select_first(&vlist) else {
        return Ok(Vec::new());
    };
    Ok(list
        .children()
        .into_iter()
        .filter_map(|row| {
            let top = row.style("top").and_then(|t| parse_em(&t))?;
            Some(Row { node: row, top })
        })
        .collect())
}

/// Whether a script row sits above the baseline: raised further than its
/// strut is tall.
fn is_raised(row: &Row<'_>) -> bool {
    let strut = row
        .node
        .children()
        .into_iter()
        .find(|c| c.has_class("pstrut"))
        .and_then(|s| s.style("height"))
        .and_then(|h| parse_em(&h))
        .unwrap_or(DEFAULT_STRUT_EM);
    -row.top > strut
}

#[derive(Debug, Default)]
struct Scripts {
    sub: Option<String>,
    sup: Option<String>,
    /// Script texts in rendered order.
    run: String,
}

impl Scripts {
    fn read(msupsub: Node<'_>) -> ExtractResult<Self> {
        let mut scripts = Scripts::default();
        for row in rows(msupsub)? {
            let text = clean(&row.node.text());
            if text.is_empty() {
                continue;
            }
            scripts.run.push_str(&text);
            if is_raised(&row) {
                scripts.sup = Some(text);
            } else {
                scripts.sub = Some(text);
            }
        }
        Ok(scripts)
    }

    fn is_empty(&self) -> bool {
        self.sub.is_none() && self.sup.is_none()
    }

    fn latex(&self, base: &str) -> String {
        let mut out = map_glyphs(base);
        if let Some(sub) = &self.sub {
            out.push_str(&format!("_{{{}}}", map_glyphs(sub)));
        }
        if let Some(sup) = &self.sup {
            out.push_str(&format!("^{{{}}}", map_glyphs(sup)));
        }
        out
    }
}

// =============================================================================
// Rules
// =============================================================================

fn fractions(layout: Node<'_>, text: &str) -> ExtractResult<String> {
    let selector = parse_selector(".mfrac")?;
    let mut current = text.to_string();
    for fraction in layout.select(&selector) {
        let Some((num, den)) = fraction_parts(fraction)? else {
            continue;
        };
        let latex = format!("\\frac{{{}}}{{{}}}", map_glyphs(&num), map_glyphs(&den));
        if let Some(rewritten) = substitute_fraction(&current, &num, &den, &latex)? {
            current = rewritten;
        }
    }
    Ok(current)
}

/// Numerator and denominator text, from the most reliable source available.
fn fraction_parts(fraction: Node<'_>) -> ExtractResult<Option<(String, String)>> {
    let mut stacked: Vec<(f32, String)> = rows(fraction)?
        .into_iter()
        .filter(|row| !row.node.has_class("frac-line") && !contains_fraction_line(row.node))
        .map(|row| (row.top, clean(&row.node.text())))
        .filter(|(_, text)| !text.is_empty())
        .collect();
    if stacked.len() >= 2 {
        // Most negative offset is the highest row.
        stacked.sort_by(|a, b| a.0.total_cmp(&b.0));
        let num = stacked.remove(0).1;
        let den = stacked.pop().map(|(_, t)| t).unwrap_or_default();
        return Ok(Some((num, den)));
    }

    let part = |class: &str| {
        fraction
            .descendants()
            .into_iter()
            .find(|n| n.has_class(class))
            .map(|n| clean(&n.text()))
            .filter(|t| !t.is_empty())
    };
    if let (Some(num), Some(den)) = (part("numerator"), part("denominator")) {
        return Ok(Some((num, den)));
    }

    let ords: Vec<String> = fraction
        .children()
        .into_iter()
        .filter(|c| c.has_class("mord"))
        .map(|c| clean(&c.text()))
        .filter(|t| !t.is_empty())
        .collect();
    if ords.len() >= 2 {
        return Ok(Some((ords[0].clone(), ords[1].clone())));
    }

    let raw = clean(&fraction.text());
    Ok(raw.split_once('/').and_then(|(num, den)| {
        let (num, den) = (num.trim(), den.trim());
        (!num.is_empty() && !den.is_empty()).then(|| (num.to_string(), den.to_string()))
    }))
}

fn contains_fraction_line(node: Node<'_>) -> bool {
    node.descendants().iter().any(|n| n.has_class("frac-line"))
}

/// Replace the rendered run of one fraction. Tighter matches are tried
/// first; at each tightness the rendered order (denominator first) comes
/// before the logical one.
fn substitute_fraction(
    text: &str,
    num: &str,
    den: &str,
    latex: &str,
) -> ExtractResult<Option<String>> {
    let (num, den) = (regex::escape(num), regex::escape(den));
    for separator in ["", r"\s*", ".*?"] {
        for (first, second) in [(&den, &num), (&num, &den)] {
            let pattern = format!("{}{}{}", first, separator, second);
            let regex = Regex::new(&pattern).map_err(|e| ExtractError::pattern(&pattern, e))?;
            if regex.is_match(text) {
                return Ok(Some(regex.replacen(text, 1, NoExpand(latex)).into_owned()));
            }
        }
    }
    Ok(None)
}

fn bayes(text: &str) -> ExtractResult<String> {
    let rule = (*BAYES_RULE).as_ref().map_err(Clone::clone)?;
    Ok(rule.apply(text))
}

fn scripts(layout: Node<'_>, text: &str) -> ExtractResult<String> {
    let selector = parse_selector(".msupsub")?;
    let mut current = text.to_string();
    for msupsub in layout.select(&selector) {
        let Some(base) = msupsub.previous_sibling().map(|b| clean(&b.text())) else {
            continue;
        };
        let scripts = Scripts::read(msupsub)?;
        if base.is_empty() || scripts.is_empty() {
            continue;
        }
        let run = format!("{}{}", base, scripts.run);
        let regex = Regex::new(&regex::escape(&run))
            .map_err(|e| ExtractError::pattern(run.as_str(), e))?;
        let latex = scripts.latex(&base).replace('$', "$$");
        current = replace_unless_followed_by(&regex, &current, is_letter, &latex, Some(1));
    }
    Ok(current)
}

fn roots(layout: Node<'_>, text: &str) -> ExtractResult<String> {
    let sqrt = parse_selector(".sqrt")?;
    let ord = parse_selector(".mord")?;
    let mut current = text.to_string();
    for root in layout.select(&sqrt) {
        let Some(radicand) = root.select_first(&ord).map(|n| clean(&n.text())) else {
            continue;
        };
        if radicand.is_empty() {
            continue;
        }
        let latex = format!("\\sqrt{{{}}}", map_glyphs(&radicand));
        let with_sign = format!("√{}", radicand);
        current = if current.contains(&with_sign) {
            current.replacen(&with_sign, &latex, 1)
        } else {
            current.replacen(&radicand, &latex, 1)
        };
    }
    Ok(current)
}

fn large_operators(layout: Node<'_>, text: &str) -> ExtractResult<String> {
    let selector = parse_selector(".mop")?;
    let mut current = text.to_string();
    for op in layout.select(&selector) {
        if op.has_class("op-limits") {
            continue;
        }
        let glyph = clean(&op.text());
        if !LARGE_OPERATORS.contains(&glyph.as_str()) {
            continue;
        }

        let (run, latex) = if let Some(limits) = op.ancestors().into_iter().find(|a| a.has_class("op-limits")) {
            stacked_limits(op, limits, &glyph)?
        } else if let Some(msupsub) = op.next_sibling().filter(|n| n.has_class("msupsub")) {
            let scripts = Scripts::read(msupsub)?;
            (format!("{}{}", glyph, scripts.run), scripts.latex(&glyph))
        } else {
            (glyph.clone(), map_glyphs(&glyph))
        };

        if current.contains(&run) {
            current = current.replacen(&run, &latex, 1);
        }
    }
    Ok(current)
}

/// Display-style limits: rows above the operator row are the upper limit,
/// rows below the lower one.
fn stacked_limits(op: Node<'_>, limits: Node<'_>, glyph: &str) -> ExtractResult<(String, String)> {
    let rows = rows(limits)?;
    let op_top = rows
        .iter()
        .find(|row| row.node == op || row.node.descendants().contains(&op))
        .map(|row| row.top);
    let mut latex = map_glyphs(glyph);
    if let Some(op_top) = op_top {
        let limit = |above: bool| {
            rows.iter()
                .filter(|row| (row.top < op_top) == above && row.top != op_top)
                .map(|row| clean(&row.node.text()))
                .find(|t| !t.is_empty())
        };
        if let Some(lower) = limit(false) {
            latex.push_str(&format!("_{{{}}}", map_glyphs(&lower)));
        }
        if let Some(upper) = limit(true) {
            latex.push_str(&format!("^{{{}}}", map_glyphs(&upper)));
        }
    }
    Ok((clean(&limits.text()), latex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathcopy_dom::Document;
    use pretty_assertions::assert_eq;

    const X_SQUARED: &str = r#"<span class="katex-html"><span class="base"><span class="mord"><span class="mord mathnormal">x</span><span class="msupsub"><span class="vlist-t"><span class="vlist-r"><span class="vlist" style="height:0.8141em;"><span style="top:-3.063em;margin-right:0.05em;"><span class="pstrut" style="height:2.7em;"></span><span class="sizing reset-size6 size3 mtight"><span class="mord mtight">2</span></span></span></span></span></span></span></span></span></span>"#;

    #[test]
    fn raised_script_is_superscript() {
        let doc = Document::parse(X_SQUARED);
        let layout = doc.query_first(".katex-html").unwrap().unwrap();
        assert_eq!(
            reconstruct("x2", Some(layout)).as_deref(),
            Some("x^{2}")
        );
    }

    #[test]
    fn bayes_text_fallback() {
        assert_eq!(
            reconstruct("P(A∣B)=P(B)P(B∣A)P(A)", None).as_deref(),
            Some("P(A|B) = \\frac{P(B|A)P(A)}{P(B)}")
        );
    }

    #[test]
    fn untouched_text_is_none() {
        assert_eq!(reconstruct("x+y", None), None);
    }

    #[test]
    fn fraction_substitution_prefers_rendered_order() {
        let out = substitute_fraction("ba+1", "a", "b", "\\frac{a}{b}").unwrap();
        assert_eq!(out.as_deref(), Some("\\frac{a}{b}+1"));
        let loose = substitute_fraction("a / b", "a", "b", "\\frac{a}{b}").unwrap();
        assert_eq!(loose.as_deref(), Some("\\frac{a}{b}"));
    }
}
