//! Text rewrite passes for rendered math with no usable layout.
//!
//! The passes run in a fixed order over the raw rendered text:
//!
//! 1. glyphs are mapped to LaTeX commands,
//! 2. whole-formula shapes from physics and chemistry are rebuilt,
//! 3. flattened sub- and superscripts are repaired (outside command names),
//! 4. bracket notation is restored,
//! 5. spacing around operators is normalized.
//!
//! Zero-width spaces in the rendered text mark where KaTeX closed a script
//! or fraction part, so they are kept until the last pass.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::core::rules::{is_letter, is_letter_or_close_brace, Rule, RuleTable};
use crate::core::symbols::map_glyphs;
use crate::utils::error::{ExtractError, ExtractResult};
use crate::utils::text::{collapse_whitespace, strip_zero_width};

pub const DOMAIN_RULES: &[Rule] = &[
    Rule::new(
        "schrodinger",
        r"i\\hbar ?\\partial ?([a-zA-Z])\\partial\x{200B}?\|\\([A-Za-z]+)\(([^)]+)\)\\rangle",
        r"i\hbar \frac{\partial}{\partial ${1}} |\${2}(${3})\rangle",
    ),
    Rule::new(
        "operator-ket-argument",
        r"([A-Z])\^\|\\([A-Za-z]+)\(([^)]+)\)\\rangle",
        r"\hat{${1}} |\${2}(${3})\rangle",
    ),
    Rule::new(
        "operator-ket",
        r"([A-Z])\^\|\\([A-Za-z]+)\\rangle",
        r"\hat{${1}} |\${2}\rangle",
    ),
    Rule::new(
        "commutator",
        r"\[?([A-Z])\^([a-z]),([A-Z])\^([a-z])\]=i\\hbar ?([A-Z])\^([a-z])",
        r"[\hat{${1}}_{${2}}, \hat{${3}}_{${4}}] = i\hbar \hat{${5}}_{${6}}",
    ),
    Rule::new(
        "dirac",
        r"i\\hbar\\gamma\\([a-zA-Z]+) ?\\partial\\([a-zA-Z]+)\x{200B}?-([a-z])([a-z])\)\\([a-zA-Z]+)=0",
        r"i\hbar \gamma^\${1} \partial_\${2} - ${3}${4}) \${5} = 0",
    ),
    Rule::new(
        "partial-derivative",
        r"\\partial ?([a-zA-Z])\\partial\x{200B}?",
        r"\partial_{${1}}",
    ),
    Rule::new(
        "integral-limits",
        r"\\int ?([a-zA-Z])([a-zA-Z])\x{200B}",
        r"\int_{${1}}^{${2}} ",
    ),
    Rule::new("times-operand", r"\\times ?([A-Z])", r" \times ${1}"),
    Rule::new("gamma-index", r"\\gamma\\([a-zA-Z]+)", r"\gamma^\${1}"),
    Rule::new(
        "partial-index",
        r"\\partial\\([a-zA-Z]+)\x{200B}?",
        r"\partial_\${1}",
    ),
    Rule::new(
        "gravitation",
        r"([A-Z])([a-z])([0-9]+)([a-z])([0-9]+)\x{200B}?([a-z])([0-9]+)\x{200B}*",
        r"${1} \frac{${4}_{${5}} ${6}_{${7}}}{${2}^{${3}}}",
    ),
    Rule::new(
        "arrhenius",
        r"([a-z])=([A-Z])e-([A-Z])([A-Z])([A-Z])([a-z])\x{200B}*",
        r"${1} = ${2} e^{-${5}_{${6}}/${3}${4}}",
    ),
    Rule::new(
        "mass-fraction",
        r"mass of compound([a-z ]+?)\x{200B}",
        r"\frac{\text{${1}}}{\text{mass of compound}}",
    ),
    Rule::new(
        "surface-integral",
        r"\\iint ?([A-Z])([^=]+)=([^=]+)",
        r"\iint_{${1}} ${2} = ${3}",
    ),
    Rule::new(
        "volume-integral",
        r"\\iiint ?([A-Z])\(([^)]+)\)([a-zA-Z]+)",
        r"\iiint_{${1}} (${2}) ${3}",
    ),
    Rule::new(
        "series-limits",
        r"([a-z])=([0-9]+)\\(sum|prod)\\infty",
        r"\${3}_{${1}=${2}}^{\infty}",
    ),
    Rule::new(
        "finite-series-limits",
        r"\\(sum|prod) ?([a-z])=([0-9]+)([a-z0-9])\x{200B}?",
        r"\${1}_{${2}=${3}}^{${4}}",
    )
    .unless_followed_by(is_letter),
    Rule::new("half-hbar", r"2\\hbar\x{200B}", r"\frac{\hbar}{2}"),
];

pub const SCRIPT_RULES: &[Rule] = &[
    Rule::new(
        "letter-subscript",
        r"([a-zA-Z])([a-zA-Z])\x{200B}",
        r"${1}_{${2}}",
    ),
    Rule::new("digit-subscript", r"([a-zA-Z])([0-9]+)\x{200B}", r"${1}_{${2}}"),
    Rule::new("digit-superscript", r"([a-zA-Z])([0-9]+)", r"${1}^{${2}}")
        .unless_followed_by(is_letter_or_close_brace),
    Rule::new("index-subscript", r"([A-Z])([a-z])", r"${1}_{${2}}")
        .unless_followed_by(is_letter_or_close_brace),
    Rule::new(
        "chemical-count",
        r"([A-Z])([0-9]+)([A-Z])",
        r"${1}_{${2}}${3}",
    ),
];

pub const BRACKET_RULES: &[Rule] = &[
    Rule::new(
        "sum-index",
        r"\\sum ?([^{\\(\s][^{\\(]*)\(",
        r"\sum_{${1}}(",
    ),
    Rule::new("paren-operator", r"\)([-+=])", r") ${1} "),
    Rule::new("bra", r"<(\\?[A-Za-z]+)\|", r"\langle ${1}|"),
    Rule::new("ket", r"\|(\\?[A-Za-z]+)>", r"|${1}\rangle"),
];

pub const SPACING_RULES: &[Rule] = &[
    Rule::new(
        "operator-spacing",
        r"([a-zA-Z0-9}\)\]])\s*([=+\-])\s*",
        r"${1} ${2} ",
    ),
    Rule::new("product-spacing", r"\s*\\(times|cdot)", r" \${1} ").unless_followed_by(is_letter),
];

/// Command names are left out of script repair.
const COMMAND: &str = r"\\[A-Za-z]+";

/// A flat `_{..}` or `^{..}` group; its operators stay unspaced.
const SCRIPT_GROUP: &str = r"[_^]\{[^{}]*\}";
const OPERATOR_GAP: &str = r"\s*([=+\-])\s*";

#[derive(Debug)]
pub struct PatternPasses {
    pub domain: RuleTable,
    pub scripts: RuleTable,
    pub brackets: RuleTable,
    pub spacing: RuleTable,
    command: Regex,
    script_group: Regex,
    operator_gap: Regex,
}

impl PatternPasses {
    pub fn compile() -> ExtractResult<Self> {
        Ok(Self {
            domain: RuleTable::compile(DOMAIN_RULES)?,
            scripts: RuleTable::compile(SCRIPT_RULES)?,
            brackets: RuleTable::compile(BRACKET_RULES)?,
            spacing: RuleTable::compile(SPACING_RULES)?,
            command: Regex::new(COMMAND).map_err(|e| ExtractError::pattern(COMMAND, e))?,
            script_group: Regex::new(SCRIPT_GROUP)
                .map_err(|e| ExtractError::pattern(SCRIPT_GROUP, e))?,
            operator_gap: Regex::new(OPERATOR_GAP)
                .map_err(|e| ExtractError::pattern(OPERATOR_GAP, e))?,
        })
    }

    pub fn rewrite(&self, text: &str) -> String {
        let text = map_glyphs(text);
        let text = self.domain.apply(&text);
        let text = self.repair_scripts(&text);
        let text = self.brackets.apply(&text);
        let text = self.spacing.apply(&text);
        let text = self.tighten_scripts(&text);
        collapse_whitespace(&strip_zero_width(&text))
    }

    /// Script repair on the text between `\command` names.
    fn repair_scripts(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for command in self.command.find_iter(text) {
            out.push_str(&self.scripts.apply(&text[last..command.start()]));
            out.push_str(command.as_str());
            last = command.end();
        }
        out.push_str(&self.scripts.apply(&text[last..]));
        out
    }

    /// Undo operator spacing inside script groups: `_{i = 1}` is `_{i=1}`.
    fn tighten_scripts(&self, text: &str) -> String {
        self.script_group
            .replace_all(text, |caps: &Captures| {
                self.operator_gap.replace_all(&caps[0], "${1}").into_owned()
            })
            .into_owned()
    }
}

lazy_static! {
    static ref PASSES: ExtractResult<PatternPasses> = PatternPasses::compile();
}

pub fn passes() -> ExtractResult<&'static PatternPasses> {
    (*PASSES).as_ref().map_err(Clone::clone)
}

/// Run every pass over `text`.
pub fn reconstruct(text: &str) -> ExtractResult<String> {
    Ok(passes()?.rewrite(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(table: &RuleTable, name: &str, text: &str) -> String {
        table
            .get(name)
            .unwrap_or_else(|| panic!("no rule {}", name))
            .apply(text)
    }

    #[test]
    fn all_tables_compile() {
        let passes = passes().unwrap();
        assert_eq!(passes.domain.len(), DOMAIN_RULES.len());
        assert_eq!(passes.scripts.len(), SCRIPT_RULES.len());
        assert_eq!(passes.brackets.len(), BRACKET_RULES.len());
        assert_eq!(passes.spacing.len(), SPACING_RULES.len());
    }

    #[test]
    fn domain_rules() {
        let d = &passes().unwrap().domain;
        assert_eq!(
            rule(d, "schrodinger", "i\\hbar\\partial t\\partial\u{200B}|\\Psi(t)\\rangle"),
            "i\\hbar \\frac{\\partial}{\\partial t} |\\Psi(t)\\rangle"
        );
        assert_eq!(
            rule(d, "operator-ket-argument", "H^|\\Psi(t)\\rangle"),
            "\\hat{H} |\\Psi(t)\\rangle"
        );
        assert_eq!(rule(d, "operator-ket", "H^|\\psi\\rangle"), "\\hat{H} |\\psi\\rangle");
        assert_eq!(
            rule(d, "commutator", "[X^i,P^j]=i\\hbar D^k"),
            "[\\hat{X}_{i}, \\hat{P}_{j}] = i\\hbar \\hat{D}_{k}"
        );
        assert_eq!(
            rule(d, "dirac", "i\\hbar\\gamma\\mu\\partial\\mu\u{200B}-mc)\\psi=0"),
            "i\\hbar \\gamma^\\mu \\partial_\\mu - mc) \\psi = 0"
        );
        assert_eq!(rule(d, "partial-derivative", "\\partial x\\partial\u{200B}f"), "\\partial_{x}f");
        assert_eq!(rule(d, "integral-limits", "\\int ab\u{200B}f"), "\\int_{a}^{b} f");
        assert_eq!(rule(d, "times-operand", "a\\times B"), "a \\times B");
        assert_eq!(rule(d, "gamma-index", "\\gamma\\nu"), "\\gamma^\\nu");
        assert_eq!(rule(d, "partial-index", "\\partial\\nu\u{200B}"), "\\partial_\\nu");
        assert_eq!(
            rule(d, "gravitation", "F=Gr2m1\u{200B}m2\u{200B}\u{200B}"),
            "F=G \\frac{m_{1} m_{2}}{r^{2}}"
        );
        assert_eq!(
            rule(d, "arrhenius", "k=Ae-RTEa\u{200B}\u{200B}"),
            "k = A e^{-E_{a}/RT}"
        );
        assert_eq!(
            rule(d, "mass-fraction", "mass of compoundmass of element\u{200B}"),
            "\\frac{\\text{mass of element}}{\\text{mass of compound}}"
        );
        assert_eq!(
            rule(d, "surface-integral", "\\iint SF\\cdot dA=\\Phi"),
            "\\iint_{S} F\\cdot dA = \\Phi"
        );
        assert_eq!(
            rule(d, "volume-integral", "\\iiint V(\\nabla\\cdot F)dV"),
            "\\iiint_{V} (\\nabla\\cdot F) dV"
        );
        assert_eq!(
            rule(d, "series-limits", "n=0\\sum\\infty"),
            "\\sum_{n=0}^{\\infty}"
        );
        assert_eq!(
            rule(d, "finite-series-limits", "\\sum i=1n"),
            "\\sum_{i=1}^{n}"
        );
        assert_eq!(
            rule(d, "finite-series-limits", "\\prod k=10m\u{200B}"),
            "\\prod_{k=10}^{m}"
        );
        assert_eq!(rule(d, "finite-series-limits", "\\sum i=1nx"), "\\sum i=1nx");
        assert_eq!(rule(d, "half-hbar", "S=2\\hbar\u{200B}"), "S=\\frac{\\hbar}{2}");
    }

    #[test]
    fn script_rules() {
        let s = &passes().unwrap().scripts;
        assert_eq!(rule(s, "letter-subscript", "St\u{200B}"), "S_{t}");
        assert_eq!(rule(s, "digit-subscript", "x1\u{200B}+x2\u{200B}"), "x_{1}+x_{2}");
        assert_eq!(rule(s, "digit-superscript", "x2+y3"), "x^{2}+y^{3}");
        assert_eq!(rule(s, "digit-superscript", "x2y"), "x2y");
        assert_eq!(rule(s, "index-subscript", "An+Bn"), "A_{n}+B_{n}");
        assert_eq!(rule(s, "index-subscript", "Ab}"), "Ab}");
        assert_eq!(rule(s, "chemical-count", "H2O"), "H_{2}O");
    }

    #[test]
    fn bracket_rules() {
        let b = &passes().unwrap().brackets;
        assert_eq!(rule(b, "sum-index", "\\sum k(a)"), "\\sum_{k}(a)");
        assert_eq!(rule(b, "paren-operator", "f(x)=1"), "f(x) = 1");
        assert_eq!(rule(b, "bra", "<\\psi|"), "\\langle \\psi|");
        assert_eq!(rule(b, "ket", "|\\phi>"), "|\\phi\\rangle");
    }

    #[test]
    fn spacing_rules() {
        let sp = &passes().unwrap().spacing;
        assert_eq!(rule(sp, "operator-spacing", "a=b+c"), "a = b + c");
        assert_eq!(rule(sp, "operator-spacing", "x^{-1}"), "x^{-1}");
        assert_eq!(rule(sp, "product-spacing", "a\\times b"), "a \\times  b");
    }

    #[test]
    fn full_passes() {
        assert_eq!(reconstruct("ax2+bx+c=0").unwrap(), "ax^{2} + bx + c = 0");
        assert_eq!(reconstruct("x2+y3=z4").unwrap(), "x^{2} + y^{3} = z^{4}");
        assert_eq!(reconstruct("An+Bn=Cn").unwrap(), "A_{n} + B_{n} = C_{n}");
        assert_eq!(reconstruct("H2O").unwrap(), "H_{2}O");
        assert_eq!(reconstruct("∑i=1n").unwrap(), "\\sum_{i=1}^{n}");
        assert_eq!(reconstruct("n=0∑∞").unwrap(), "\\sum_{n=0}^{\\infty}");
        assert_eq!(
            reconstruct("iℏ∂t∂\u{200B}∣Ψ(t)⟩=H^∣Ψ(t)⟩").unwrap(),
            "i\\hbar \\frac{\\partial}{\\partial t} |\\Psi(t)\\rangle = \\hat{H} |\\Psi(t)\\rangle"
        );
        assert_eq!(
            reconstruct("F=Gr2m1\u{200B}m2\u{200B}\u{200B}").unwrap(),
            "F = G \\frac{m_{1} m_{2}}{r^{2}}"
        );
        assert_eq!(
            reconstruct("k=Ae−RTEa\u{200B}\u{200B}").unwrap(),
            "k = A e^{-E_{a}/RT}"
        );
    }

    #[test]
    fn script_groups_keep_operators_tight() {
        let passes = passes().unwrap();
        assert_eq!(passes.tighten_scripts("x_{i = 1} = y"), "x_{i=1} = y");
        assert_eq!(passes.tighten_scripts("e^{-E_{a}/RT}"), "e^{-E_{a}/RT}");
    }

    #[test]
    fn command_names_are_not_scripted() {
        assert_eq!(reconstruct("α2").unwrap(), "\\alpha2");
        assert_eq!(reconstruct("θn").unwrap(), "\\theta n");
    }
}
