//! Keyword Coverage Verifier — lexical presence of target keywords.
//!
//! A keyword is present iff its escaped literal text matches case-insensitively
//! with word boundaries at its edges. Boundaries are only asserted on edges that
//! are word characters, so "C++" and ".NET" still match as whole tokens.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Partition of a keyword list into present and missing, both in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl CoverageResult {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Fraction of keywords present. An empty keyword list counts as fully covered.
    pub fn ratio(&self) -> f32 {
        let total = self.present.len() + self.missing.len();
        if total == 0 {
            return 1.0;
        }
        self.present.len() as f32 / total as f32
    }
}

/// A keyword occurrence inside a single line or text, as byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub keyword: String,
}

/// Compiles a boundary-anchored, case-insensitive matcher for one keyword.
/// Returns `None` for blank keywords or patterns the regex engine rejects.
pub fn keyword_matcher(keyword: &str) -> Option<Regex> {
    let keyword = keyword.trim();
    let first = keyword.chars().next()?;
    let last = keyword.chars().last()?;

    let mut pattern = String::with_capacity(keyword.len() + 8);
    if is_word_char(first) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(keyword));
    if is_word_char(last) {
        pattern.push_str(r"\b");
    }

    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Keyword {keyword:?} could not be compiled, treating as missing: {e}");
            None
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Returns true iff `keyword` is present in `document`.
pub fn contains_keyword(document: &str, keyword: &str) -> bool {
    keyword_matcher(keyword).is_some_and(|re| re.is_match(document))
}

/// Splits `keywords` into present/missing against `document`.
pub fn coverage<S: AsRef<str>>(document: &str, keywords: &[S]) -> CoverageResult {
    let mut result = CoverageResult::default();
    for keyword in keywords {
        let keyword = keyword.as_ref();
        if contains_keyword(document, keyword) {
            result.present.push(keyword.to_string());
        } else {
            result.missing.push(keyword.to_string());
        }
    }
    result
}

/// Finds every keyword occurrence in `text`, sorted by start offset.
///
/// Overlapping occurrences collapse to the one that starts first; on equal
/// starts the longer match wins.
pub fn find_matches<S: AsRef<str>>(text: &str, keywords: &[S]) -> Vec<HighlightSpan> {
    let mut spans: Vec<HighlightSpan> = keywords
        .iter()
        .filter_map(|k| keyword_matcher(k.as_ref()).map(|re| (k.as_ref(), re)))
        .flat_map(|(keyword, re)| {
            re.find_iter(text)
                .map(|m| HighlightSpan {
                    start: m.start(),
                    end: m.end(),
                    keyword: keyword.trim().to_string(),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut merged: Vec<HighlightSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last() {
            Some(prev) if span.start < prev.end => continue,
            _ => merged.push(span),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_match_is_present() {
        let result = coverage("Python developer", &["Python"]);
        assert_eq!(result.present, vec!["Python"]);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_word_prefix_is_not_a_match() {
        let result = coverage("Pythonic code", &["Python"]);
        assert!(result.present.is_empty());
        assert_eq!(result.missing, vec!["Python"]);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(contains_keyword("deployed on KUBERNETES clusters", "kubernetes"));
        assert!(contains_keyword("Built a saas platform", "SaaS"));
    }

    #[test]
    fn test_symbol_edged_keywords_match() {
        assert!(contains_keyword("Wrote C++ services", "C++"));
        assert!(contains_keyword("Migrated to .NET 8", ".NET"));
        assert!(contains_keyword("CI/CD pipelines", "CI/CD"));
        assert!(!contains_keyword("Wrote C services", "C++"));
    }

    #[test]
    fn test_regex_metacharacters_are_escaped() {
        assert!(!contains_keyword("node.js", "node?js"));
        assert!(contains_keyword("Built with Node.js", "node.js"));
        assert!(!contains_keyword("Built with Nodexjs", "node.js"));
    }

    #[test]
    fn test_blank_keywords_are_missing() {
        let result = coverage("anything", &["", "   "]);
        assert!(result.present.is_empty());
        assert_eq!(result.missing.len(), 2);
    }

    #[test]
    fn test_partition_preserves_order_and_duplicates() {
        let keywords = ["Go", "Rust", "Java", "Rust", "SQL"];
        let result = coverage("Rust and SQL", &keywords);
        assert_eq!(result.present, vec!["Rust", "Rust", "SQL"]);
        assert_eq!(result.missing, vec!["Go", "Java"]);
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let documents = ["", "Rust Go", "## SKILLS\n\nKafka, gRPC, C#", "x+y"];
        let keywords = ["Rust", "Kafka", "gRPC", "C#", "Go", "", "x"];
        for doc in documents {
            let result = coverage(doc, &keywords);
            assert_eq!(result.present.len() + result.missing.len(), keywords.len());
            for keyword in keywords {
                let in_present = result.present.iter().any(|k| k == keyword);
                let in_missing = result.missing.iter().any(|k| k == keyword);
                assert!(in_present ^ in_missing, "{keyword:?} in {doc:?}");
            }
        }
    }

    #[test]
    fn test_ratio() {
        assert!((coverage("Rust", &["Rust", "Go"]).ratio() - 0.5).abs() < f32::EPSILON);
        assert!((coverage::<&str>("Rust", &[]).ratio() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_find_matches_reports_offsets() {
        let spans = find_matches("Used Rust and rust daily", &["Rust"]);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (5, 9));
        assert_eq!((spans[1].start, spans[1].end), (14, 18));
        assert_eq!(spans[0].keyword, "Rust");
    }

    #[test]
    fn test_find_matches_prefers_longest_overlap() {
        let spans = find_matches("Deployed the SaaS platform", &["SaaS", "SaaS platform"]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].keyword, "SaaS platform");
        assert_eq!((spans[0].start, spans[0].end), (13, 26));
    }
}
