//! Diff/Compare Engine — audit view of original vs optimized text.
//!
//! Set-based, not sequence alignment: a line counts as removed/added only if
//! its whitespace- and case-insensitive signature is absent from the other
//! side. Reordered bullets therefore register as unchanged. There is no
//! "modified" state; an edited line shows up as one removal plus one addition.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::refinement::coverage::{find_matches, HighlightSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Unchanged,
    Removed,
    Added,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    /// 1-based line number within its own side.
    pub line_number: usize,
    pub text: String,
    pub kind: LineKind,
    /// Keyword matches. Only populated on the optimized side.
    pub highlights: Vec<HighlightSpan>,
}

impl DiffLine {
    /// Wraps every highlight span in `open`/`close` markup.
    pub fn render_marked(&self, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + self.highlights.len() * 16);
        let mut cursor = 0;
        for span in &self.highlights {
            if span.start < cursor || span.end > self.text.len() {
                continue;
            }
            out.push_str(&self.text[cursor..span.start]);
            out.push_str(open);
            out.push_str(&self.text[span.start..span.end]);
            out.push_str(close);
            cursor = span.end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub original_lines: Vec<DiffLine>,
    pub optimized_lines: Vec<DiffLine>,
    pub summary: ComparisonSummary,
}

/// Compares `original` against `optimized` and highlights `keywords` in the
/// optimized text. Pure — safe to call on every render.
pub fn compare<S: AsRef<str>>(original: &str, optimized: &str, keywords: &[S]) -> Comparison {
    let original_signatures = signatures(original);
    let optimized_signatures = signatures(optimized);

    let original_lines = classify(original, &optimized_signatures, LineKind::Removed)
        .map(|(line_number, text, kind)| DiffLine {
            line_number,
            text: text.to_string(),
            kind,
            highlights: Vec::new(),
        })
        .collect::<Vec<_>>();

    let optimized_lines = classify(optimized, &original_signatures, LineKind::Added)
        .map(|(line_number, text, kind)| DiffLine {
            line_number,
            text: text.to_string(),
            kind,
            highlights: find_matches(text, keywords),
        })
        .collect::<Vec<_>>();

    let mut summary = ComparisonSummary::default();
    for line in original_lines.iter().chain(optimized_lines.iter()) {
        match line.kind {
            LineKind::Added => summary.added += 1,
            LineKind::Removed => summary.removed += 1,
            LineKind::Unchanged if !line.text.trim().is_empty() => summary.unchanged += 1,
            LineKind::Unchanged => {}
        }
    }

    Comparison {
        original_lines,
        optimized_lines,
        summary,
    }
}

/// Trim, lowercase, and collapse internal whitespace runs to one space.
fn signature(line: &str) -> String {
    line.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn signatures(text: &str) -> HashSet<String> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(signature)
        .collect()
}

/// Tags each line of `text`; a non-blank line absent from `other` gets `absent_kind`.
fn classify<'a>(
    text: &'a str,
    other: &'a HashSet<String>,
    absent_kind: LineKind,
) -> impl Iterator<Item = (usize, &'a str, LineKind)> + 'a {
    text.lines().enumerate().map(move |(idx, line)| {
        let kind = if line.trim().is_empty() || other.contains(&signature(line)) {
            LineKind::Unchanged
        } else {
            absent_kind
        };
        (idx + 1, line, kind)
    })
}
