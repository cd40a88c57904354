//! Query extraction: turns one search box string into tag facets plus a pattern
//!
//! A search string may start with a bracket expression listing tags,
//! `[summer, home]hero`, which filters by tags `summer` and `home` and matches
//! `hero` against image names. Everything after the bracket is the residual
//! pattern, compiled as a case-insensitive regular expression.

use super::normalize::{normalize_name, normalize_path};
use crate::config::PatternOptions;
use crate::error::PatternError;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

/// Structured form of a raw search string
#[derive(Debug, Clone)]
pub struct StructuredQuery {
    /// Normalized tags listed in a leading bracket expression
    pub facet_tags: BTreeSet<String>,

    /// Compiled residual pattern; `None` matches every name
    pub pattern: Option<Regex>,

    /// Input text with the bracket expression removed, as typed
    pub residual: String,

    /// Whether a leading bracket expression was found and removed
    pub bracket_consumed: bool,

    /// Why the residual failed to compile, if it did
    pub error: Option<PatternError>,

    /// Longest candidate the pattern is evaluated against
    match_limit: usize,
}

impl StructuredQuery {
    /// A query that matches everything
    pub fn match_all() -> Self {
        Self {
            facet_tags: BTreeSet::new(),
            pattern: None,
            residual: String::new(),
            bracket_consumed: false,
            error: None,
            match_limit: PatternOptions::default().max_match_len,
        }
    }

    /// True when neither tags nor a pattern restrict the result
    pub fn is_match_all(&self) -> bool {
        self.facet_tags.is_empty() && self.pattern.is_none()
    }

    /// Test the pattern against an item name
    ///
    /// The name is normalized as a path first. Without a pattern every name
    /// matches.
    pub fn test_name(&self, name: &str) -> Result<bool, PatternError> {
        let Some(pattern) = &self.pattern else {
            return Ok(true);
        };

        let candidate = normalize_path(name);
        if candidate.len() > self.match_limit {
            return Err(PatternError::CandidateTooLong {
                len: candidate.len(),
                limit: self.match_limit,
            });
        }

        Ok(pattern.is_match(&candidate))
    }
}

impl Default for StructuredQuery {
    fn default() -> Self {
        Self::match_all()
    }
}

/// Extract a structured query using default pattern limits
pub fn extract_query(raw: &str) -> StructuredQuery {
    extract_query_with(raw, &PatternOptions::default())
}

/// Extract a structured query
///
/// Never fails. A residual that does not compile yields `pattern: None` with
/// the reason recorded in `error`.
pub fn extract_query_with(raw: &str, options: &PatternOptions) -> StructuredQuery {
    let (facet_tags, residual, bracket_consumed) = match split_bracket(raw) {
        Some((interior, rest)) => (parse_tags(interior), rest, true),
        None => (BTreeSet::new(), raw, false),
    };

    let (pattern, error) = match compile_pattern(residual, options) {
        Ok(pattern) => (pattern, None),
        Err(err) => (None, Some(err)),
    };

    StructuredQuery {
        facet_tags,
        pattern,
        residual: residual.to_string(),
        bracket_consumed,
        error,
        match_limit: options.max_match_len,
    }
}

/// Split a leading `[...]` off the input
///
/// Only a bracket at position 0 counts, and it ends at the first `]`.
fn split_bracket(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix('[')?;
    let end = rest.find(']')?;
    Some((&rest[..end], &rest[end + 1..]))
}

/// Parse the comma-separated interior of a bracket expression
pub fn parse_tags(interior: &str) -> BTreeSet<String> {
    interior
        .split(',')
        .map(normalize_name)
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Compile a residual pattern case-insensitively
///
/// The residual is compiled exactly as typed; only an empty one produces no
/// pattern.
pub fn compile_pattern(
    residual: &str,
    options: &PatternOptions,
) -> Result<Option<Regex>, PatternError> {
    if residual.is_empty() {
        return Ok(None);
    }

    RegexBuilder::new(residual)
        .case_insensitive(true)
        .size_limit(options.size_limit)
        .build()
        .map(Some)
        .map_err(|e| PatternError::Invalid {
            pattern: residual.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_input() {
        let query = extract_query("");
        assert!(query.facet_tags.is_empty());
        assert!(query.pattern.is_none());
        assert!(query.error.is_none());
        assert!(!query.bracket_consumed);
        assert!(query.is_match_all());
    }

    #[test]
    fn test_bracket_only_collapses_duplicates() {
        let query = extract_query("[a,b,a]");
        assert_eq!(query.facet_tags, tags(&["a", "b"]));
        assert_eq!(query.residual, "");
        assert!(query.pattern.is_none());
        assert!(query.bracket_consumed);
    }

    #[test]
    fn test_bracket_with_rest() {
        let query = extract_query("[tag1, tag2]rest");
        assert_eq!(query.facet_tags, tags(&["tag1", "tag2"]));
        assert_eq!(query.residual, "rest");
        let pattern = query.pattern.as_ref().unwrap();
        assert_eq!(pattern.as_str(), "rest");
        assert!(query.test_name("Forest.png").unwrap());
    }

    #[test]
    fn test_unclosed_bracket_is_literal() {
        let query = extract_query("[");
        assert!(query.facet_tags.is_empty());
        assert!(!query.bracket_consumed);
        assert_eq!(query.residual, "[");
        // "[" alone is not a valid regex
        assert!(query.pattern.is_none());
        assert!(matches!(query.error, Some(PatternError::Invalid { .. })));
    }

    #[test]
    fn test_bracket_not_at_start_is_literal() {
        let query = extract_query("x[a]");
        assert!(query.facet_tags.is_empty());
        assert!(!query.bracket_consumed);
        // "[a]" is a character class here
        assert!(query.test_name("xa").unwrap());
    }

    #[test]
    fn test_bracket_ends_at_first_close() {
        let query = extract_query("[a]b]");
        assert_eq!(query.facet_tags, tags(&["a"]));
        assert_eq!(query.residual, "b]");
    }

    #[test]
    fn test_empty_bracket_adds_no_tags() {
        let query = extract_query("[]");
        assert!(query.facet_tags.is_empty());
        assert!(query.bracket_consumed);
        assert!(query.pattern.is_none());

        let query = extract_query("[ , ,!]");
        assert!(query.facet_tags.is_empty());
    }

    #[test]
    fn test_tags_are_normalized() {
        let query = extract_query("[ Summer , HỌC sinh, #home ]");
        assert_eq!(query.facet_tags, tags(&["home", "họcsinh", "summer"]));
    }

    #[test]
    fn test_pattern_is_case_insensitive() {
        let query = extract_query("HERO");
        assert!(query.test_name("banners/hero.png").unwrap());
        assert!(!query.test_name("banners/villain.png").unwrap());
    }

    #[test]
    fn test_pattern_keeps_metacharacters() {
        let query = extract_query("^banners/.*png$");
        assert!(query.test_name("Banners/Hero.png").unwrap());
        assert!(!query.test_name("icons/banners.png").unwrap());
    }

    #[test]
    fn test_invalid_pattern_is_recorded() {
        let query = extract_query("[tag]hero(");
        assert_eq!(query.facet_tags, tags(&["tag"]));
        assert!(query.pattern.is_none());
        match query.error {
            Some(PatternError::Invalid { pattern, .. }) => assert_eq!(pattern, "hero("),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_residual_compiled_as_typed() {
        let query = extract_query("[a]   ");
        assert_eq!(query.residual, "   ");
        assert!(query.pattern.is_some());
        assert!(query.error.is_none());
        // Normalized names never contain spaces
        assert!(!query.test_name("a b c.png").unwrap());

        let query = extract_query(" hero");
        assert!(!query.test_name("hero.png").unwrap());
        assert!(extract_query("hero").test_name("hero.png").unwrap());
    }

    #[test]
    fn test_candidate_over_limit_fails() {
        let options = PatternOptions {
            max_match_len: 4,
            ..PatternOptions::default()
        };
        let query = extract_query_with("a", &options);
        assert!(query.test_name("abc").unwrap());
        assert_eq!(
            query.test_name("abcdef"),
            Err(PatternError::CandidateTooLong { len: 6, limit: 4 })
        );
    }

    #[test]
    fn test_size_limit_rejects_huge_pattern() {
        let options = PatternOptions {
            size_limit: 16,
            ..PatternOptions::default()
        };
        let query = extract_query_with("a{1000}", &options);
        assert!(query.pattern.is_none());
        assert!(query.error.is_some());
    }
}
