//! Key patterns and matching strategy selection
//!
//! Group lookups apply a [`Pattern`] to every flattened key. Patterns are plain
//! regular expressions, but most of them do not need a regex engine at all:
//! [`classify`] picks the cheapest [`Strategy`] that still gives the correct
//! answer for the pattern's shape.
//!
//! ```rust
//! use confmap::pattern::{self, Strategy};
//!
//! let find = pattern::build(false, &["stock.amd"]).unwrap();
//! assert_eq!(find.as_str(), r"stock\.amd.*");
//! assert_eq!(find.strategy(), Strategy::Find);
//!
//! let full = pattern::build(true, &["stock.amd"]).unwrap();
//! assert_eq!(full.as_str(), r".*stock\.amd.*");
//! assert_eq!(full.strategy(), Strategy::FullMatch);
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Wildcard appended after every term and optionally prepended.
pub const WILDCARD: &str = ".*";

/// Errors returned when building a pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// The pattern text is not a valid expression.
    #[error("invalid pattern '{pattern}': {source}")]
    Invalid {
        /// Offending pattern text.
        pattern: String,
        /// Underlying compile error.
        #[source]
        source: regex::Error,
    },
}

/// How a pattern is applied to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Plain substring test; the pattern has no special characters.
    Contains,
    /// Unanchored search; the pattern has no leading wildcard.
    Find,
    /// Whole-key match; required when the pattern starts with a wildcard.
    FullMatch,
}

impl Strategy {
    /// Get the strategy as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Strategy::Contains => "contains",
            Strategy::Find => "find",
            Strategy::FullMatch => "full_match",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled key pattern with its matching strategy.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    strategy: Strategy,
    search: Regex,
    anchored: Option<Regex>,
}

impl Pattern {
    /// Compile a caller-written pattern.
    pub fn new(text: impl Into<String>) -> Result<Self, PatternError> {
        let text = text.into();
        let search = compile(&text)?;
        let strategy = classify_text(&text);
        let anchored = match strategy {
            Strategy::FullMatch => Some(compile(&format!("^(?:{text})$"))?),
            Strategy::Contains | Strategy::Find => None,
        };

        Ok(Self {
            text,
            strategy,
            search,
            anchored,
        })
    }

    /// The pattern that matches every key.
    ///
    /// Compiled once per process; later calls clone the cached pattern.
    pub fn catch_all() -> Result<Self, PatternError> {
        static CATCH_ALL: OnceLock<Pattern> = OnceLock::new();
        if let Some(pattern) = CATCH_ALL.get() {
            return Ok(pattern.clone());
        }
        let pattern = Self::new(WILDCARD)?;
        Ok(CATCH_ALL.get_or_init(|| pattern).clone())
    }

    /// Pattern source text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Strategy selected for this pattern
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Test `key` using the pattern's strategy.
    ///
    /// Keys are matched as given; the lookup engine lower-cases them first.
    pub fn matches(&self, key: &str) -> bool {
        match self.strategy {
            Strategy::Contains => key.contains(self.text.as_str()),
            Strategy::Find => self.search.is_match(key),
            Strategy::FullMatch => self
                .anchored
                .as_ref()
                .map_or(false, |anchored| anchored.is_match(key)),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::new(s)
    }
}

/// Build a pattern from free-form key fragments.
///
/// Every `.` in a term is escaped and every term is followed by a wildcard, so
/// the terms must appear in order. `require_prefix_wildcard` allows the first
/// term to start anywhere in the key, which forces [`Strategy::FullMatch`].
/// No terms yields the catch-all pattern.
pub fn build<S: AsRef<str>>(
    require_prefix_wildcard: bool,
    terms: &[S],
) -> Result<Pattern, PatternError> {
    if terms.is_empty() {
        return Pattern::catch_all();
    }

    let mut text = String::new();
    if require_prefix_wildcard {
        text.push_str(WILDCARD);
    }
    for term in terms {
        text.push_str(&term.as_ref().replace('.', "\\."));
        text.push_str(WILDCARD);
    }

    Pattern::new(text)
}

/// Select the matching strategy for a pattern.
pub fn classify(pattern: &Pattern) -> Strategy {
    pattern.strategy
}

fn classify_text(text: &str) -> Strategy {
    if !text.contains(['*', '+', '\\']) {
        Strategy::Contains
    } else if !text.starts_with(WILDCARD) {
        Strategy::Find
    } else {
        Strategy::FullMatch
    }
}

fn compile(text: &str) -> Result<Regex, PatternError> {
    Regex::new(text).map_err(|source| PatternError::Invalid {
        pattern: text.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_escapes_dots() {
        let pattern = build(false, &["stock.amd"]).unwrap();
        assert_eq!(pattern.as_str(), r"stock\.amd.*");
        assert_eq!(classify(&pattern), Strategy::Find);
    }

    #[test]
    fn test_build_prefix_wildcard() {
        let pattern = build(true, &["stock.amd"]).unwrap();
        assert_eq!(pattern.as_str(), r".*stock\.amd.*");
        assert_eq!(classify(&pattern), Strategy::FullMatch);
    }

    #[test]
    fn test_build_multiple_terms() {
        let pattern = build(false, &["stocks", "amd"]).unwrap();
        assert_eq!(pattern.as_str(), "stocks.*amd.*");
        assert!(pattern.matches("stocks.stock.amd.shares"));
        assert!(!pattern.matches("amd.stocks"));
    }

    #[test]
    fn test_build_empty_is_catch_all() {
        let empty: [&str; 0] = [];
        let pattern = build(true, &empty).unwrap();
        assert_eq!(pattern.as_str(), ".*");
        assert!(pattern.matches(""));
        assert!(pattern.matches("anything.at.all"));
    }

    #[test]
    fn test_catch_all_is_reused() {
        let first = Pattern::catch_all().unwrap();
        let second = Pattern::catch_all().unwrap();
        assert_eq!(first.as_str(), WILDCARD);
        assert_eq!(first.as_str(), second.as_str());
        assert_eq!(second.strategy(), Strategy::FullMatch);
        assert!(second.matches(""));
        assert!(second.matches("stock.amd.shares"));
    }

    #[test]
    fn test_build_rejects_malformed_term() {
        let err = build(false, &["stock(amd"]).unwrap_err();
        match err {
            PatternError::Invalid { pattern, .. } => assert_eq!(pattern, "stock(amd.*"),
        }
    }

    #[test]
    fn test_classify_contains() {
        let pattern = Pattern::new("amd").unwrap();
        assert_eq!(pattern.strategy(), Strategy::Contains);
        assert!(pattern.matches("stock.amd.shares"));
        assert!(!pattern.matches("stock.intc.shares"));
    }

    #[test]
    fn test_classify_plus_and_backslash() {
        assert_eq!(Pattern::new("a+").unwrap().strategy(), Strategy::Find);
        assert_eq!(Pattern::new(r"a\.b").unwrap().strategy(), Strategy::Find);
        assert_eq!(Pattern::new(".*b").unwrap().strategy(), Strategy::FullMatch);
    }

    #[test]
    fn test_full_match_requires_whole_key() {
        let pattern = Pattern::new(".*amd").unwrap();
        assert!(pattern.matches("stock.amd"));
        assert!(!pattern.matches("stock.amd.shares"));
    }

    #[test]
    fn test_find_is_unanchored() {
        let pattern = build(false, &["amd"]).unwrap();
        assert!(pattern.matches("stock.amd.shares"));
    }

    #[test]
    fn test_from_str() {
        let pattern: Pattern = "stock.*".parse().unwrap();
        assert_eq!(pattern.to_string(), "stock.*");
        assert!("(".parse::<Pattern>().is_err());
    }
}
