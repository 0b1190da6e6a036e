//! Structural Normalizer — rewrites rewriter output into canonical markdown.
//!
//! Steps run in a fixed order:
//! 1. split heading markers that appear mid-line onto their own line
//! 2. repair a first line that fuses a section label with body text
//! 3. drop extraneous top-level (`#`) title headings at the start
//! 4. canonicalize recognized section headings to `## LABEL`
//! 5. re-apply blank-line spacing around every heading
//!
//! The result is a fixed point: normalizing normalized output is a no-op.
//! Malformed or empty input degrades to best-effort output, never an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::refinement::sections::SectionLabel;

/// Separators the rewriter puts between a fused label and its body.
const LABEL_SEPARATORS: &[char] = &[':', '-', '|', '–', '—'];

/// Runs the full normalization pipeline.
pub fn normalize(markdown: &str) -> String {
    let text = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let text = split_inline_headings(&text);

    let mut lines: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();

    repair_leading_line(&mut lines);
    canonicalize_headings(&mut lines);

    layout(&lines)
}

// ────────────────────────────────────────────────────────────────────────────
// Step 1: mid-line heading markers
// ────────────────────────────────────────────────────────────────────────────

fn split_inline_headings(text: &str) -> String {
    static INLINE_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"([^\s#])[ \t]+(#{2,3})[ \t]+").expect("valid regex")
    });

    INLINE_HEADING_RE
        .replace_all(text, "$1\n\n$2 ")
        .into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Steps 2 + 3: first non-empty line
// ────────────────────────────────────────────────────────────────────────────

fn repair_leading_line(lines: &mut Vec<String>) {
    loop {
        let Some(idx) = lines.iter().position(|l| !l.trim().is_empty()) else {
            return;
        };

        let line = lines[idx].trim().to_string();
        let unmarked = line.trim_start_matches('#').trim_start();

        if let Some((label, rest)) = SectionLabel::match_prefix(unmarked) {
            let body = rest.trim_start_matches(|c: char| c.is_whitespace() || LABEL_SEPARATORS.contains(&c));
            lines[idx] = label.heading();
            if !body.is_empty() {
                lines.insert(idx + 1, body.to_string());
            }
            return;
        }

        if is_title_heading(&line) {
            lines.remove(idx);
            continue;
        }

        return;
    }
}

fn is_title_heading(line: &str) -> bool {
    line == "#" || line.starts_with("# ") || line.starts_with("#\t")
}

// ────────────────────────────────────────────────────────────────────────────
// Step 4: heading canonicalization
// ────────────────────────────────────────────────────────────────────────────

fn canonicalize_headings(lines: &mut [String]) {
    static SECTION_HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*#{1,3}\s+(.+)$").expect("valid regex"));

    for line in lines.iter_mut() {
        let Some(caps) = SECTION_HEADING_RE.captures(line) else {
            continue;
        };
        if let Some(label) = SectionLabel::from_heading_text(&caps[1]) {
            *line = label.heading();
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Step 5: spacing
// ────────────────────────────────────────────────────────────────────────────

/// True for any markdown ATX heading line (`#` through `######` then space).
pub(crate) fn is_heading(line: &str) -> bool {
    heading_level(line).is_some()
}

/// The ATX level of a heading line, `None` for anything else.
pub(crate) fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    let marked = (1..=6).contains(&hashes)
        && line[hashes..]
            .chars()
            .next()
            .is_some_and(|c| c == ' ' || c == '\t');
    marked.then_some(hashes)
}

fn layout(lines: &[String]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 8);
    let mut pending_blank = false;
    let mut previous_was_heading = false;

    for line in lines {
        if line.trim().is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }

        let heading = is_heading(line);
        if !out.is_empty() && (pending_blank || heading || previous_was_heading) {
            out.push("");
        }
        out.push(line);

        previous_was_heading = heading;
        pending_blank = false;
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_idempotent(input: &str) {
        let once = normalize(input);
        let twice = normalize(&once);
        assert_eq!(once, twice, "not idempotent for input {input:?}");
    }

    #[test]
    fn test_inline_label_artifact_becomes_heading() {
        assert_eq!(normalize("Experiences\nBuilt X"), "## EXPERIENCE\n\nBuilt X");
    }

    #[test]
    fn test_fused_label_and_body_split_apart() {
        assert_eq!(
            normalize("Skills: Rust, Go, Kubernetes"),
            "## SKILLS\n\nRust, Go, Kubernetes"
        );
        assert_eq!(
            normalize("# Summary — Backend engineer with 8 years"),
            "## SUMMARY\n\nBackend engineer with 8 years"
        );
    }

    #[test]
    fn test_first_line_that_only_starts_like_a_label_is_kept() {
        assert_eq!(
            normalize("Experienced engineer\n\n## Skills\nRust"),
            "Experienced engineer\n\n## SKILLS\n\nRust"
        );
    }

    #[test]
    fn test_extraneous_title_heading_removed() {
        let input = "# Jane Doe\n\n## Summary\nBuilds things.";
        assert_eq!(normalize(input), "## SUMMARY\n\nBuilds things.");
    }

    #[test]
    fn test_stacked_title_headings_all_removed() {
        let input = "# Optimized Resume\n# Jane Doe\nStaff engineer.\n## experience\n- Led X";
        let normalized = normalize(input);
        assert_eq!(normalized, "Staff engineer.\n\n## EXPERIENCE\n\n- Led X");
        assert_idempotent(input);
    }

    #[test]
    fn test_mid_line_heading_split() {
        let input = "Shipped the platform. ## Skills\nRust";
        assert_eq!(
            normalize(input),
            "Shipped the platform.\n\n## SKILLS\n\nRust"
        );
    }

    #[test]
    fn test_mid_line_split_ignores_non_heading_hashes() {
        assert_eq!(normalize("Wrote C## code"), "Wrote C## code");
        assert_eq!(normalize("Ticket #42 fixed"), "Ticket #42 fixed");
    }

    #[test]
    fn test_heading_canonicalization_variants() {
        let input = "## SUMMARY\nx\n### Experiences\ny\n## education:\nz\n## technical skills\nw";
        assert_eq!(
            normalize(input),
            "## SUMMARY\n\nx\n\n## EXPERIENCE\n\ny\n\n## EDUCATION\n\nz\n\n## SKILLS\n\nw"
        );
    }

    #[test]
    fn test_unrecognized_headings_untouched() {
        let input = "## SUMMARY\nx\n## Volunteer Work\ny";
        assert_eq!(
            normalize(input),
            "## SUMMARY\n\nx\n\n## Volunteer Work\n\ny"
        );
    }

    #[test]
    fn test_heading_spacing_is_exactly_one_blank_line() {
        let input = "## SUMMARY\n\n\n\nx\n## SKILLS\n\n\ny\n\n\n";
        assert_eq!(normalize(input), "## SUMMARY\n\nx\n\n## SKILLS\n\ny");
    }

    #[test]
    fn test_crlf_input_normalized() {
        assert_eq!(
            normalize("## Skills\r\nRust\r\n"),
            "## SKILLS\n\nRust"
        );
    }

    #[test]
    fn test_empty_and_whitespace_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\n\t\n"), "");
        assert_eq!(normalize("#"), "");
        assert_eq!(normalize("# "), "");
    }

    #[test]
    fn test_idempotence_over_assorted_inputs() {
        let inputs = [
            "",
            "#",
            "##",
            "## ",
            "Experiences\nBuilt X",
            "Skills Skills Rust",
            "# Title\n# Skills\nRust",
            "text ## Skills ### Projects\nfoo",
            "a\n\n\n\nb\n# c\nd",
            "## SUMMARY\nSpearheaded a team of 5, deploying the SaaS platform.\n",
            "  ## Experience  \n  - item  \n",
            "Summary: Led teams ## Experience\n- Did things\n## skill\n- Rust",
            "#\n#\n#\nExperience",
            "####### not a heading\n## Profile",
            "—\n| Skills |",
        ];
        for input in inputs {
            assert_idempotent(input);
        }
    }

    /// Deterministic xorshift so generated inputs are reproducible.
    struct XorShift(u64);

    impl XorShift {
        fn next(&mut self) -> u64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            self.0
        }

        fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
            items[(self.next() % items.len() as u64) as usize]
        }
    }

    #[test]
    fn test_idempotence_over_generated_inputs() {
        const FRAGMENTS: &[&str] = &[
            "", " ", "\t", "\n", "\n\n", "\r\n", "\r", "#", "# ", "## ", "### ", "#### ",
            "#######", "Skills", "skill", "Experiences", "Work Experience", "Summary:",
            "Profile", "Technical Skills", "Education", "Projects", "Certification",
            "Experienced", "Rust", "C++", "Led a team", " ## ", " ### ", ": ", " - ", " | ",
            "—", "–", "Ünïcödé", "- item", "C##", "Jane Doe",
        ];

        let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
        for _ in 0..5_000 {
            let len = (rng.next() % 12) as usize;
            let input: String = (0..len).map(|_| rng.pick(FRAGMENTS)).collect();

            let once = normalize(&input);
            assert_eq!(normalize(&once), once, "not idempotent for input {input:?}");

            let lines: Vec<&str> = once.lines().collect();
            for (i, line) in lines.iter().enumerate() {
                if !is_heading(line) {
                    continue;
                }
                if i > 0 {
                    assert_eq!(lines[i - 1], "", "no blank before heading in {once:?}");
                }
                if i + 1 < lines.len() {
                    assert_eq!(lines[i + 1], "", "no blank after heading in {once:?}");
                }
            }
        }
    }

    #[test]
    fn test_is_heading() {
        assert!(is_heading("## SKILLS"));
        assert!(is_heading("# Title"));
        assert!(!is_heading("#hashtag"));
        assert!(!is_heading("####### seven"));
        assert!(!is_heading("plain"));
        assert_eq!(heading_level("### Languages"), Some(3));
        assert_eq!(heading_level("## SKILLS"), Some(2));
        assert_eq!(heading_level("#hashtag"), None);
    }
}
