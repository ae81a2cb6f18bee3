//! Unicode math glyph → LaTeX table.

use phf::phf_map;

/// Rendered glyphs and the LaTeX they came from.
pub static SYMBOLS: phf::Map<char, &'static str> = phf_map! {
    // Integrals
    '∫' => "\\int",
    '∬' => "\\iint",
    '∭' => "\\iiint",
    '∮' => "\\oint",

    // Differential operators
    '∂' => "\\partial",
    '∇' => "\\nabla",
    '∆' => "\\Delta",

    // Products
    '⋅' => "\\cdot",
    '×' => "\\times",
    '÷' => "\\div",
    '∘' => "\\circ",

    // Quantum mechanics
    'ℏ' => "\\hbar",
    '∣' => "|",
    '⟩' => "\\rangle",
    '⟨' => "\\langle",

    // Greek
    'α' => "\\alpha", 'β' => "\\beta", 'γ' => "\\gamma", 'δ' => "\\delta",
    'ε' => "\\varepsilon", 'ϵ' => "\\epsilon", 'ζ' => "\\zeta", 'η' => "\\eta",
    'θ' => "\\theta", 'ι' => "\\iota", 'κ' => "\\kappa", 'λ' => "\\lambda",
    'μ' => "\\mu", 'ν' => "\\nu", 'ξ' => "\\xi", 'π' => "\\pi",
    'ρ' => "\\rho", 'σ' => "\\sigma", 'τ' => "\\tau", 'υ' => "\\upsilon",
    'φ' => "\\varphi", 'ϕ' => "\\phi", 'χ' => "\\chi", 'ψ' => "\\psi",
    'ω' => "\\omega",
    'Γ' => "\\Gamma", 'Δ' => "\\Delta", 'Θ' => "\\Theta", 'Λ' => "\\Lambda",
    'Ξ' => "\\Xi", 'Π' => "\\Pi", 'Σ' => "\\Sigma", 'Υ' => "\\Upsilon",
    'Φ' => "\\Phi", 'Ψ' => "\\Psi", 'Ω' => "\\Omega",

    // Operators and relations
    '≤' => "\\leq", '≥' => "\\geq", '≠' => "\\neq", '≈' => "\\approx",
    '≡' => "\\equiv", '∞' => "\\infty", '±' => "\\pm", '∓' => "\\mp",
    '∑' => "\\sum", '∏' => "\\prod", '√' => "\\sqrt", '−' => "-",
    '⋯' => "\\cdots", '⋮' => "\\vdots", '∝' => "\\propto",

    // Sets
    '∈' => "\\in", '∉' => "\\notin", '⊂' => "\\subset", '⊃' => "\\supset",
    '⊆' => "\\subseteq", '⊇' => "\\supseteq",
    '∪' => "\\cup", '∩' => "\\cap", '∅' => "\\emptyset",

    // Logic and arrows
    '∧' => "\\land", '∨' => "\\lor", '¬' => "\\neg", '→' => "\\to",
    '←' => "\\leftarrow", '↔' => "\\leftrightarrow", '⇒' => "\\Rightarrow",
    '⇔' => "\\Leftrightarrow", '∀' => "\\forall", '∃' => "\\exists",
};

pub fn lookup(glyph: char) -> Option<&'static str> {
    SYMBOLS.get(&glyph).copied()
}

/// Replace every mapped glyph with its LaTeX.
///
/// A command followed directly by an ASCII letter gets a separating space so
/// `ϕn` becomes `\phi n`, not the unknown `\phin`.
pub fn map_glyphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match lookup(c) {
            Some(latex) => {
                out.push_str(latex);
                let is_command = latex.starts_with('\\');
                if is_command && chars.peek().is_some_and(|next| next.is_ascii_alphabetic()) {
                    out.push(' ');
                }
            }
            None => out.push(c),
        }
    }
    out
}
