//! Keyword prioritization — ranks and truncates a raw keyword set before it is
//! embedded into a rewrite instruction.
//!
//! Pluggable like the rest of the refinement seams: `AppState` carries an
//! `Arc<dyn KeywordPrioritizer>`. The orchestrator re-truncates to its own
//! per-pass bound regardless of what the prioritizer returns.

use std::collections::HashSet;

use crate::refinement::coverage::contains_keyword;

pub trait KeywordPrioritizer: Send + Sync {
    /// Returns at most `limit` keywords, highest priority first.
    fn prioritize(&self, keywords: &[String], limit: usize) -> Vec<String>;
}

/// Default prioritizer: caller order is priority order.
///
/// Drops blanks, trims, de-duplicates case-insensitively (first spelling wins)
/// and truncates.
pub struct OrderedPrioritizer;

impl KeywordPrioritizer for OrderedPrioritizer {
    fn prioritize(&self, keywords: &[String], limit: usize) -> Vec<String> {
        dedup_keywords(keywords).into_iter().take(limit).collect()
    }
}

/// Trims and removes blank or case-insensitively repeated keywords, keeping
/// the first spelling seen.
pub fn dedup_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Skills from `candidates` that appear in both the original resume and the
/// job context. These are the skills a refined resume must never lose.
pub fn shared_skills(original: &str, job_context: &str, candidates: &[String]) -> Vec<String> {
    dedup_keywords(candidates)
        .into_iter()
        .filter(|skill| contains_keyword(original, skill) && contains_keyword(job_context, skill))
        .collect()
}
