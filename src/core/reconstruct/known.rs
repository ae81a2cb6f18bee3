//! Formulas recognised whole from their rendered text.
//!
//! Some common formulas come out of layout-only rendering too scrambled for
//! the rewrite passes. They are matched by co-occurring fragments instead.

/// A formula and the fragments that identify it. Every group must match;
/// a group matches when any of its alternatives occurs in the text.
#[derive(Debug, Clone, Copy)]
pub struct KnownFormula {
    pub name: &'static str,
    pub groups: &'static [&'static [&'static str]],
    pub latex: &'static str,
}

impl KnownFormula {
    pub fn matches(&self, text: &str) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|fragment| text.contains(fragment)))
    }
}

pub const KNOWN: &[KnownFormula] = &[
    KnownFormula {
        name: "sine-series",
        groups: &[&["sin"], &["3!"], &["5!"]],
        latex: "\\sin(x) = x - \\frac{x^3}{3!} + \\frac{x^5}{5!} - \\cdots = \\sum_{n=0}^{\\infty} \\frac{(-1)^n}{(2n+1)!} x^{2n+1}",
    },
    KnownFormula {
        name: "cosine-series",
        groups: &[&["cos"], &["2!"], &["4!"]],
        latex: "\\cos(x) = 1 - \\frac{x^2}{2!} + \\frac{x^4}{4!} - \\cdots = \\sum_{n=0}^{\\infty} \\frac{(-1)^n}{(2n)!} x^{2n}",
    },
    KnownFormula {
        name: "exponential-series",
        groups: &[&["ex=1+x+", "e^x=1+x+", "ex = 1 + x"], &["2!"], &["3!"]],
        latex: "e^x = 1 + x + \\frac{x^2}{2!} + \\frac{x^3}{3!} + \\cdots = \\sum_{n=0}^{\\infty} \\frac{x^n}{n!}",
    },
    KnownFormula {
        name: "black-scholes-put",
        groups: &[&["P(St"], &["Ke−r", "Ke-r"], &["N(−d", "N(-d"]],
        latex: "P(S_t, t) = K e^{-r(T-t)} N(-d_2) - S_t e^{-qt} N(-d_1)",
    },
    KnownFormula {
        name: "black-scholes-call",
        groups: &[&["C(St"], &["e−qt", "e-qt"], &["N(d"]],
        latex: "C(S_t, t) = S_t e^{-qt} N(d_1) - K e^{-r(T-t)} N(d_2)",
    },
    KnownFormula {
        name: "black-scholes-d1",
        groups: &[&["d1", "d₁", "d_1"], &["="], &["ln", "log", "σ", "sigma"]],
        latex: "d_1 = \\frac{\\ln\\left(\\frac{S_t}{K}\\right) + \\left(r - q + \\frac{\\sigma^2}{2}\\right)(T - t)}{\\sigma\\sqrt{T - t}}",
    },
    KnownFormula {
        name: "radian-angle",
        groups: &[&["θ"], &["rad"], &["rs", "s/r", "sr"]],
        latex: "\\theta(\\text{rad}) = \\frac{s}{r}",
    },
];

/// First known formula present in `text` (zero-width characters removed).
pub fn lookup(text: &str) -> Option<&'static KnownFormula> {
    KNOWN.iter().find(|formula| formula.matches(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_of(text: &str) -> Option<&'static str> {
        lookup(text).map(|f| f.name)
    }

    #[test]
    fn taylor_series() {
        assert_eq!(name_of("sin(x)=x−3!x3+5!x5−⋯"), Some("sine-series"));
        assert_eq!(name_of("cos(x)=1−2!x2+4!x4−⋯"), Some("cosine-series"));
        assert_eq!(name_of("ex=1+x+2!x2+3!x3+⋯"), Some("exponential-series"));
    }

    #[test]
    fn black_scholes() {
        assert_eq!(
            name_of("P(St,t)=Ke−r(T−t)N(−d2)−Ste−qtN(−d1)"),
            Some("black-scholes-put")
        );
        assert_eq!(
            name_of("C(St,t)=Ste−qtN(d1)−Ke−r(T−t)N(d2)"),
            Some("black-scholes-call")
        );
        assert_eq!(
            name_of("d1=σT−tln(KSt)+(r−q+2σ2)(T−t)"),
            Some("black-scholes-d1")
        );
    }

    #[test]
    fn radian_angle() {
        assert_eq!(name_of("θ(rad)=rs"), Some("radian-angle"));
    }

    #[test]
    fn every_group_must_match() {
        assert_eq!(name_of("sin(x) = 3!"), None);
        assert_eq!(name_of("x+y"), None);
    }
}
