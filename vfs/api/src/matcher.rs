//! Wildcard matching of entry names.

use regex::Regex;

/// The pattern used when the caller does not supply one.
pub const MATCH_ALL: &str = "*";

/// A compiled file-name pattern where `*` matches any sequence of characters.
///
/// Matching is anchored on the whole name: `*.txt` matches `a.txt` but not
/// `a.txt.bak`. Every character other than `*` is taken literally.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: String,
    regex: Regex,
}

impl PathMatcher {
    pub fn new(pattern: &str) -> Self {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        // Escaped literals joined by `.*` always form a valid expression.
        let regex = Regex::new(&format!("^(?s:{body})$")).expect("escaped wildcard pattern");
        Self {
            pattern: pattern.to_string(),
            regex,
        }
    }

    /// Build a matcher from an optional pattern, defaulting to [`MATCH_ALL`].
    pub fn from_optional(pattern: Option<&str>) -> Self {
        Self::new(pattern.unwrap_or(MATCH_ALL))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new(MATCH_ALL)
    }
}
