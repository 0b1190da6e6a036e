//! The rewrite collaborator seam.
//!
//! The refinement loop never talks to a model directly; it calls a `Rewriter`.
//! `LlmClient` is the production implementation. Tests swap in stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::prompts::MARKDOWN_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::refinement::prompts::REWRITE_PROMPT_TEMPLATE;

/// The role a resume is being refined for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobContext {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub description: String,
}

impl JobContext {
    /// Human-readable block embedded into rewrite prompts.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            out.push_str(&format!("Title: {}\n", title.trim()));
        }
        if let Some(company) = self.company.as_deref().filter(|c| !c.trim().is_empty()) {
            out.push_str(&format!("Company: {}\n", company.trim()));
        }
        out.push_str(self.description.trim());
        out
    }

    /// All text keywords can be matched against.
    pub fn searchable_text(&self) -> String {
        [
            self.title.as_deref().unwrap_or_default(),
            self.company.as_deref().unwrap_or_default(),
            self.description.as_str(),
        ]
        .join("\n")
    }
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("LLM rewrite failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Rewriter returned an empty document")]
    EmptyContent,

    #[error("Rewrite rejected: {0}")]
    Rejected(String),
}

/// Produces a revised resume from the current one and a pass instruction.
/// Output is unconstrained markdown; callers normalize it.
#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(
        &self,
        current: &str,
        instruction: &str,
        context: &JobContext,
    ) -> Result<String, RewriteError>;
}

#[async_trait]
impl Rewriter for LlmClient {
    async fn rewrite(
        &self,
        current: &str,
        instruction: &str,
        context: &JobContext,
    ) -> Result<String, RewriteError> {
        let prompt = build_rewrite_prompt(current, instruction, context);
        Ok(self.complete(&prompt, MARKDOWN_ONLY_SYSTEM).await?)
    }
}

fn build_rewrite_prompt(current: &str, instruction: &str, context: &JobContext) -> String {
    let job_context = context.render();
    fill_template(
        REWRITE_PROMPT_TEMPLATE,
        &[
            ("{instruction}", instruction),
            ("{job_context}", job_context.as_str()),
            ("{resume}", current),
        ],
    )
}

/// Substitutes placeholders in a single scan of `template`. Substituted text
/// is never scanned again, so user content containing `{resume}` stays literal.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let capacity = template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    let mut rest = template;

    loop {
        let next = values
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, *value)))
            .min_by_key(|(at, _, _)| *at);
        let Some((at, key, value)) = next else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + key.len()..];
    }
}
