//! Recognized resume section vocabulary.
//!
//! Every recognized section has exactly one canonical heading text and a set of
//! aliases the rewriter tends to produce. Alias matching is case-insensitive and
//! tolerates singular/plural forms.

use serde::{Deserialize, Serialize};

/// A resume section the normalizer knows how to canonicalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
}

/// Alias table, longest aliases first so that prefix matching prefers
/// "technical skills" over "skill".
const ALIASES: &[(&str, SectionLabel)] = &[
    ("professional experiences", SectionLabel::Experience),
    ("professional experience", SectionLabel::Experience),
    ("professional summary", SectionLabel::Summary),
    ("work experiences", SectionLabel::Experience),
    ("work experience", SectionLabel::Experience),
    ("technical skills", SectionLabel::Skills),
    ("technical skill", SectionLabel::Skills),
    ("certifications", SectionLabel::Certifications),
    ("certification", SectionLabel::Certifications),
    ("experiences", SectionLabel::Experience),
    ("core skills", SectionLabel::Skills),
    ("experience", SectionLabel::Experience),
    ("educations", SectionLabel::Education),
    ("education", SectionLabel::Education),
    ("summaries", SectionLabel::Summary),
    ("projects", SectionLabel::Projects),
    ("summary", SectionLabel::Summary),
    ("project", SectionLabel::Projects),
    ("profile", SectionLabel::Summary),
    ("skills", SectionLabel::Skills),
    ("skill", SectionLabel::Skills),
];

impl SectionLabel {
    /// The one heading text this section is rendered with after normalization.
    pub fn canonical(self) -> &'static str {
        match self {
            SectionLabel::Summary => "SUMMARY",
            SectionLabel::Experience => "EXPERIENCE",
            SectionLabel::Education => "EDUCATION",
            SectionLabel::Skills => "SKILLS",
            SectionLabel::Projects => "PROJECTS",
            SectionLabel::Certifications => "CERTIFICATIONS",
        }
    }

    /// The canonical level-2 heading line, e.g. `## SKILLS`.
    pub fn heading(self) -> String {
        format!("## {}", self.canonical())
    }

    /// Resolves a complete heading text (without `#` markers) to a label.
    /// A single trailing colon is ignored.
    pub fn from_heading_text(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_suffix(':').unwrap_or(text).trim_end();
        let lowered = text.to_lowercase();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, label)| *label)
    }

    /// Matches a recognized label at the start of `text`, returning the label
    /// and the remainder after it. The label must end at a non-alphanumeric
    /// boundary, so "Experienced engineer" does not match.
    pub fn match_prefix(text: &str) -> Option<(Self, &str)> {
        for (alias, label) in ALIASES {
            let Some(head) = text.get(..alias.len()) else {
                continue;
            };
            if !head.eq_ignore_ascii_case(alias) {
                continue;
            }
            let rest = &text[alias.len()..];
            match rest.chars().next() {
                Some(c) if c.is_alphanumeric() => continue,
                _ => return Some((*label, rest)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_maps_to_one_canonical_label() {
        for text in ["Experiences", "EXPERIENCES", "experience", "Work Experience:"] {
            assert_eq!(
                SectionLabel::from_heading_text(text),
                Some(SectionLabel::Experience),
                "{text}"
            );
        }
        assert_eq!(
            SectionLabel::from_heading_text("technical skills"),
            Some(SectionLabel::Skills)
        );
        assert_eq!(SectionLabel::from_heading_text("Hobbies"), None);
    }

    #[test]
    fn test_aliases_resolve_to_themselves() {
        for (alias, label) in ALIASES {
            assert_eq!(SectionLabel::from_heading_text(alias), Some(*label));
        }
    }

    #[test]
    fn test_canonical_text_round_trips() {
        let all = [
            SectionLabel::Summary,
            SectionLabel::Experience,
            SectionLabel::Education,
            SectionLabel::Skills,
            SectionLabel::Projects,
            SectionLabel::Certifications,
        ];
        for label in all {
            assert_eq!(SectionLabel::from_heading_text(label.canonical()), Some(label));
        }
    }

    #[test]
    fn test_match_prefix_requires_boundary() {
        assert!(SectionLabel::match_prefix("Experienced engineer").is_none());

        let (label, rest) = SectionLabel::match_prefix("Skills: Rust, Go").unwrap();
        assert_eq!(label, SectionLabel::Skills);
        assert_eq!(rest, ": Rust, Go");

        let (label, rest) = SectionLabel::match_prefix("Technical Skills").unwrap();
        assert_eq!(label, SectionLabel::Skills);
        assert_eq!(rest, "");
    }

    #[test]
    fn test_match_prefix_handles_multibyte_text() {
        assert!(SectionLabel::match_prefix("Ünïcödé résumé").is_none());
        assert!(SectionLabel::match_prefix("").is_none());
    }
}
