// Shared prompt fragments for every rewrite call.
// Pass-specific instructions live in refinement::prompts.

/// System prompt for all resume rewrite calls — markdown out, nothing else.
pub const MARKDOWN_ONLY_SYSTEM: &str = "You are an expert resume editor. \
    You MUST respond with the complete revised resume as markdown only. \
    Use level-2 headings (## SUMMARY, ## EXPERIENCE, ## SKILLS, ...) for sections. \
    Do NOT wrap the resume in code fences. \
    Do NOT include explanations, notes, or apologies before or after the resume.";

/// Hard constraints appended to every rewrite instruction.
pub const FABRICATION_GUARD: &str = "\
    HARD CONSTRAINTS (never violate): \
    - Do NOT invent claims, metrics, tools, or responsibilities that the resume does not already support. \
    - Do NOT alter any employer name, job title, or date. \
    - Do NOT delete existing skills.";
