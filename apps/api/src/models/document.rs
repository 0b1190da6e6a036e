use serde::{Serialize, Serializer};

use crate::refinement::normalizer::{heading_level, normalize};
use crate::refinement::sections::SectionLabel;

/// A resume in canonical markdown form.
///
/// The only constructor runs the normalizer, so every `Document` already
/// satisfies the heading/spacing invariants and re-normalizing it is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
}

/// Headings at this level or above start a new section. Deeper headings
/// (`### Languages`) stay inside the body of the section they belong to.
const SECTION_LEVEL: usize = 2;

/// A heading-delimited slice of a document. Text before the first heading
/// forms a section with no heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub label: Option<SectionLabel>,
    pub heading: Option<String>,
    pub body: Vec<String>,
}

impl Section {
    fn render(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.body.len() + 2);
        if let Some(heading) = &self.heading {
            parts.push(heading);
            parts.push("");
        }
        parts.extend(self.body.iter().map(String::as_str));
        parts.join("\n")
    }
}

impl Document {
    pub fn normalize(raw: &str) -> Self {
        Self {
            text: normalize(raw),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Splits the document at every `#` or `##` heading, in document order.
    pub fn sections(&self) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        let mut current = Section {
            label: None,
            heading: None,
            body: Vec::new(),
        };

        for line in self.text.lines() {
            if heading_level(line).is_some_and(|level| level <= SECTION_LEVEL) {
                if current.heading.is_some() || !current.body.is_empty() {
                    sections.push(current);
                }
                current = Section {
                    label: SectionLabel::from_heading_text(line.trim_start_matches('#')),
                    heading: Some(line.to_string()),
                    body: Vec::new(),
                };
                continue;
            }
            if line.is_empty() && current.body.is_empty() {
                continue;
            }
            current.body.push(line.to_string());
        }

        if current.heading.is_some() || !current.body.is_empty() {
            sections.push(current);
        }

        for section in &mut sections {
            while section.body.last().is_some_and(|l| l.is_empty()) {
                section.body.pop();
            }
        }
        sections
    }

    /// The first section carrying `label`, if any.
    pub fn section(&self, label: SectionLabel) -> Option<Section> {
        self.sections().into_iter().find(|s| s.label == Some(label))
    }

    /// Replaces the first `label` section with `replacement`, or appends it
    /// when the document has no such section. The result is re-normalized.
    pub fn replace_section(&self, label: SectionLabel, replacement: &Section) -> Document {
        let mut sections = self.sections();
        match sections.iter_mut().find(|s| s.label == Some(label)) {
            Some(existing) => *existing = replacement.clone(),
            None => sections.push(replacement.clone()),
        }

        let rendered = sections
            .iter()
            .map(Section::render)
            .collect::<Vec<_>>()
            .join("\n\n");
        Document::normalize(&rendered)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe, Staff Engineer\n\n## Summary\nBuilds platforms.\n\n## experience\n- Led payments team\n- Cut latency 40%\n\n## Skills\nRust, Go";

    #[test]
    fn test_document_is_normalized_on_construction() {
        let doc = Document::normalize("Experiences\nBuilt X");
        assert_eq!(doc.as_str(), "## EXPERIENCE\n\nBuilt X");
        assert_eq!(Document::normalize(doc.as_str()), doc);
    }

    #[test]
    fn test_sections_split_on_headings() {
        let doc = Document::normalize(RESUME);
        let sections = doc.sections();

        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0].label, None);
        assert_eq!(sections[0].body, vec!["Jane Doe, Staff Engineer"]);
        assert_eq!(sections[1].label, Some(SectionLabel::Summary));
        assert_eq!(sections[2].label, Some(SectionLabel::Experience));
        assert_eq!(sections[2].body, vec!["- Led payments team", "- Cut latency 40%"]);
        assert_eq!(sections[3].heading.as_deref(), Some("## SKILLS"));
    }

    #[test]
    fn test_section_lookup() {
        let doc = Document::normalize(RESUME);
        let skills = doc.section(SectionLabel::Skills).unwrap();
        assert_eq!(skills.body, vec!["Rust, Go"]);
        assert!(doc.section(SectionLabel::Projects).is_none());
    }

    #[test]
    fn test_replace_existing_section() {
        let doc = Document::normalize(RESUME);
        let replacement = Document::normalize("## SKILLS\nRust, Go, Kafka")
            .section(SectionLabel::Skills)
            .unwrap();

        let updated = doc.replace_section(SectionLabel::Skills, &replacement);
        assert!(updated.as_str().ends_with("## SKILLS\n\nRust, Go, Kafka"));
        assert!(updated.as_str().contains("- Led payments team"));
        assert_eq!(updated.sections().len(), 4);
    }

    #[test]
    fn test_replace_missing_section_appends() {
        let doc = Document::normalize("## SUMMARY\nBuilds platforms.");
        let replacement = Section {
            label: Some(SectionLabel::Skills),
            heading: Some(SectionLabel::Skills.heading()),
            body: vec!["Rust".to_string()],
        };
        let updated = doc.replace_section(SectionLabel::Skills, &replacement);
        assert_eq!(
            updated.as_str(),
            "## SUMMARY\n\nBuilds platforms.\n\n## SKILLS\n\nRust"
        );
    }

    #[test]
    fn test_subheadings_stay_inside_their_section() {
        let doc = Document::normalize(
            "## SKILLS\n### Languages\nRust, Go\n### Tools\nTerraform\n## EDUCATION\nBSc",
        );
        let sections = doc.sections();
        assert_eq!(sections.len(), 2);

        let skills = doc.section(SectionLabel::Skills).unwrap();
        assert_eq!(
            skills.body,
            vec!["### Languages", "", "Rust, Go", "", "### Tools", "", "Terraform"]
        );
    }

    #[test]
    fn test_replace_section_carries_subheadings() {
        let doc = Document::normalize("## SUMMARY\nRust engineer\n## SKILLS\n### Languages\nRust");
        let replacement = Document::normalize("## SKILLS\n### Languages\nRust\n### Tools\nTerraform")
            .section(SectionLabel::Skills)
            .unwrap();

        let updated = doc.replace_section(SectionLabel::Skills, &replacement);
        assert_eq!(
            updated.as_str(),
            "## SUMMARY\n\nRust engineer\n\n## SKILLS\n\n### Languages\n\nRust\n\n### Tools\n\nTerraform"
        );
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let doc = Document::normalize("## Skills\nRust");
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, "\"## SKILLS\\n\\nRust\"");
    }
}
