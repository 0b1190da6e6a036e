// Pass instructions for the refinement loop.
// Cross-cutting fragments come from llm_client::prompts.

use crate::llm_client::prompts::FABRICATION_GUARD;

/// Rewrite prompt template sent by the LLM-backed rewriter.
/// Replace: {instruction}, {job_context}, {resume}
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"{instruction}

TARGET ROLE:
{job_context}

CURRENT RESUME (markdown — revise it and return the complete resume):
{resume}"#;

/// Mandatory first pass: weave the prioritized keyword list in.
pub fn boost_instruction(keywords: &[String]) -> String {
    format!(
        "Revise this resume so it reads as a strong match for the target role.\n\
        Work these keywords in naturally where the existing experience supports them \
        (do NOT keyword-stuff):\n{}\n\n{FABRICATION_GUARD}",
        bullet_list(keywords)
    )
}

/// Single follow-up pass: only the keywords still missing after boosting.
pub fn follow_up_instruction(missing: &[String]) -> String {
    format!(
        "The revised resume still lacks these keywords:\n{}\n\n\
        Place each one ONLY where it plausibly fits existing experience, skills, or projects. \
        If a keyword does not fit anywhere truthfully, leave it out. \
        Keep every other line unchanged.\n\n{FABRICATION_GUARD}",
        bullet_list(missing)
    )
}

/// Optional last pass, restricted to the skills section.
pub fn skill_backfill_instruction(skills: &[String]) -> String {
    format!(
        "Edit ONLY the ## SKILLS section of this resume. Make sure it lists these skills, \
        which the candidate already has:\n{}\n\n\
        Do NOT change any other section. If the resume has no SKILLS section, add one at the end.\n\n\
        {FABRICATION_GUARD}",
        bullet_list(skills)
    )
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
