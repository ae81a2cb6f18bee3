//! Ordered regex rewrite tables.
//!
//! A [`Rule`] is a `(pattern, template)` pair with an optional guard on the
//! character that follows a match. The `regex` crate has no look-around, so
//! guards are checked by hand after each match.

use regex::Regex;

use crate::utils::error::{ExtractError, ExtractResult};

// =============================================================================
// Rules
// =============================================================================

/// Condition on the character right after a match.
#[derive(Debug, Clone, Copy)]
pub enum Guard {
    Always,
    /// Skip the match when the next character satisfies the predicate.
    NotFollowedBy(fn(char) -> bool),
}

/// One rewrite: every (unguarded) match of `pattern` is expanded through
/// `template` (`${1}` style group references).
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub template: &'static str,
    pub guard: Guard,
}

impl Rule {
    pub const fn new(name: &'static str, pattern: &'static str, template: &'static str) -> Self {
        Self {
            name,
            pattern,
            template,
            guard: Guard::Always,
        }
    }

    pub const fn unless_followed_by(mut self, blocked: fn(char) -> bool) -> Self {
        self.guard = Guard::NotFollowedBy(blocked);
        self
    }

    pub fn compile(&self) -> ExtractResult<CompiledRule> {
        let regex =
            Regex::new(self.pattern).map_err(|e| ExtractError::pattern(self.pattern, e))?;
        Ok(CompiledRule { rule: *self, regex })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: Rule,
    regex: Regex,
}

impl CompiledRule {
    pub fn name(&self) -> &'static str {
        self.rule.name
    }

    pub fn apply(&self, text: &str) -> String {
        match self.rule.guard {
            Guard::Always => self.regex.replace_all(text, self.rule.template).into_owned(),
            Guard::NotFollowedBy(blocked) => {
                replace_unless_followed_by(&self.regex, text, blocked, self.rule.template, None)
            }
        }
    }
}

/// A compiled, ordered list of rules applied one after another.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    pub fn compile(rules: &[Rule]) -> ExtractResult<Self> {
        let rules = rules
            .iter()
            .map(Rule::compile)
            .collect::<ExtractResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.rules {
            let next = rule.apply(&current);
            if next != current {
                log::trace!("rule {} rewrote {:?} -> {:?}", rule.name(), current, next);
                current = next;
            }
        }
        current
    }

    pub fn get(&self, name: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Pattern sets
// =============================================================================

/// A list of regexes tested with "any of" semantics.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    pub fn compile(sources: &[&str]) -> ExtractResult<Self> {
        let patterns = sources
            .iter()
            .map(|source| Regex::new(source).map_err(|e| ExtractError::pattern(*source, e)))
            .collect::<ExtractResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn any_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// `Regex::replacen` with a negative look-ahead on one character.
///
/// A match whose following character satisfies `blocked` is left as is.
/// `limit` caps the number of replacements (`None` for all).
pub fn replace_unless_followed_by(
    regex: &Regex,
    text: &str,
    blocked: fn(char) -> bool,
    template: &str,
    limit: Option<usize>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut replaced = 0;
    for caps in regex.captures_iter(text) {
        if limit.is_some_and(|max| replaced >= max) {
            break;
        }
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if text[whole.end()..].chars().next().is_some_and(blocked) {
            continue;
        }
        out.push_str(&text[last..whole.start()]);
        caps.expand(template, &mut out);
        last = whole.end();
        replaced += 1;
    }
    out.push_str(&text[last..]);
    out
}

pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_letter_or_close_brace(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '}'
}
