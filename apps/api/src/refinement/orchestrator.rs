//! Refinement Orchestrator — the bounded multi-pass rewrite loop.
//!
//! Flow: Boosting → FollowUp → SkillBackfill → Done.
//!
//! - Boosting is mandatory. If it fails there is no usable document, so the
//!   error goes back to the caller.
//! - FollowUp runs at most once, only if coverage still has gaps.
//! - SkillBackfill runs at most once, only if must-include skills are absent,
//!   and may only change the SKILLS section.
//! - Every rewrite result is normalized before it replaces the current draft.
//! - Failures and cancellation after the first pass end the loop early with the
//!   last good document.
//!
//! Coverage is reported as a diagnostic; it is never a postcondition.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::document::Document;
use crate::refinement::coverage::{coverage, CoverageResult};
use crate::refinement::prioritizer::KeywordPrioritizer;
use crate::refinement::prompts::{
    boost_instruction, follow_up_instruction, skill_backfill_instruction,
};
use crate::refinement::rewriter::{JobContext, RewriteError, Rewriter};
use crate::refinement::sections::SectionLabel;

/// Hard ceiling: one pass per state.
pub const MAX_PASSES: u32 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Inputs / outputs
// ────────────────────────────────────────────────────────────────────────────

/// Product-tuned bounds for the loop. Loaded from env in `Config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementConfig {
    pub max_passes: u32,
    pub boost_keyword_limit: usize,
    pub follow_up_keyword_limit: usize,
    pub backfill_skill_limit: usize,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_passes: MAX_PASSES,
            boost_keyword_limit: 18,
            follow_up_keyword_limit: 12,
            backfill_skill_limit: 12,
        }
    }
}

impl RefinementConfig {
    /// Pass budget clamped to `1..=MAX_PASSES`. Boosting always runs.
    pub fn pass_budget(&self) -> u32 {
        self.max_passes.clamp(1, MAX_PASSES)
    }
}

#[derive(Debug, Clone)]
pub struct RefinementRequest {
    pub original: String,
    pub context: JobContext,
    pub keywords: Vec<String>,
    /// Skills the candidate has that the role also asks for. May be empty.
    pub must_include_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Boosting,
    FollowUp,
    SkillBackfill,
}

/// One request/response cycle with the rewriter. Built, sent, then dropped.
#[derive(Debug, Clone)]
pub struct RefinementPass {
    pub attempt: u32,
    pub kind: PassKind,
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// Every keyword and must-include skill is present.
    Converged,
    /// Gaps remain but no further pass is allowed.
    PassBudgetExhausted,
    /// A rewrite after the first pass failed; the previous draft was kept.
    CollaboratorFailure { attempt: u32, message: String },
    /// The caller cancelled between passes.
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefinementDiagnostics {
    pub passes_run: u32,
    pub passes: Vec<PassKind>,
    pub stop_reason: StopReason,
    pub coverage: CoverageResult,
    pub skill_coverage: CoverageResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefinementOutcome {
    pub document: Document,
    pub diagnostics: RefinementDiagnostics,
}

#[derive(Debug, Error)]
pub enum RefineError {
    /// The mandatory first pass failed — nothing usable was produced.
    #[error("First rewrite pass failed: {0}")]
    FirstPass(#[source] RewriteError),
}

// ────────────────────────────────────────────────────────────────────────────
// State machine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum State {
    Boosting,
    FollowUp,
    SkillBackfill,
    Done(Option<StopReason>),
}

/// Loop-local bookkeeping. Only the latest draft is kept.
struct Run<'a> {
    rewriter: &'a dyn Rewriter,
    request: &'a RefinementRequest,
    cancel: Option<&'a watch::Receiver<bool>>,
    budget: u32,
    document: Option<Document>,
    passes: Vec<PassKind>,
}

/// Runs the refinement loop and returns the latest normalized document.
pub async fn optimize(
    rewriter: &dyn Rewriter,
    prioritizer: &dyn KeywordPrioritizer,
    request: &RefinementRequest,
    config: &RefinementConfig,
    cancel: Option<&watch::Receiver<bool>>,
) -> Result<RefinementOutcome, RefineError> {
    let mut run = Run {
        rewriter,
        request,
        cancel,
        budget: config.pass_budget(),
        document: None,
        passes: Vec::with_capacity(MAX_PASSES as usize),
    };

    let mut state = State::Boosting;

    let forced_stop = loop {
        state = match state {
            State::Boosting => {
                let keywords = truncate(
                    prioritizer.prioritize(&request.keywords, config.boost_keyword_limit),
                    config.boost_keyword_limit,
                );
                let pass = run.next_pass(PassKind::Boosting, boost_instruction(&keywords));
                let document = run
                    .send(&pass, &request.original)
                    .await
                    .and_then(|text| draft(&text))
                    .map_err(RefineError::FirstPass)?;
                run.document = Some(document);
                State::FollowUp
            }

            State::FollowUp => {
                let current = run.current();
                let missing = coverage(current.as_str(), &request.keywords).missing;
                if missing.is_empty() {
                    debug!("All keywords present after {} pass(es)", run.passes.len());
                    State::SkillBackfill
                } else if let Some(done) = run.gate() {
                    done
                } else {
                    let missing = truncate(
                        prioritizer.prioritize(&missing, config.follow_up_keyword_limit),
                        config.follow_up_keyword_limit,
                    );
                    if missing.is_empty() {
                        // only blank keywords were missing
                        state = State::SkillBackfill;
                        continue;
                    }
                    let pass = run.next_pass(PassKind::FollowUp, follow_up_instruction(&missing));
                    match run.send(&pass, current.as_str()).await.and_then(|text| draft(&text)) {
                        Ok(document) => {
                            run.document = Some(document);
                            State::SkillBackfill
                        }
                        Err(e) => State::Done(Some(failure(&pass, e))),
                    }
                }
            }

            State::SkillBackfill => {
                let current = run.current();
                let absent = coverage(current.as_str(), &request.must_include_skills).missing;
                if absent.is_empty() {
                    State::Done(None)
                } else if let Some(done) = run.gate() {
                    done
                } else {
                    let absent = truncate(
                        prioritizer.prioritize(&absent, config.backfill_skill_limit),
                        config.backfill_skill_limit,
                    );
                    if absent.is_empty() {
                        state = State::Done(None);
                        continue;
                    }
                    let pass =
                        run.next_pass(PassKind::SkillBackfill, skill_backfill_instruction(&absent));
                    match run.send(&pass, current.as_str()).await {
                        Ok(text) => {
                            run.document = Some(splice_skills(&current, &text));
                            State::Done(None)
                        }
                        Err(e) => State::Done(Some(failure(&pass, e))),
                    }
                }
            }

            State::Done(stop) => break stop,
        };
    };

    let document = run.current();
    let keyword_coverage = coverage(document.as_str(), &request.keywords);
    let skill_coverage = coverage(document.as_str(), &request.must_include_skills);

    let stop_reason = forced_stop.unwrap_or_else(|| {
        if keyword_coverage.is_complete() && skill_coverage.is_complete() {
            StopReason::Converged
        } else {
            StopReason::PassBudgetExhausted
        }
    });

    info!(
        "Refinement finished after {} pass(es): {:?}, {}/{} keywords present",
        run.passes.len(),
        stop_reason,
        keyword_coverage.present.len(),
        request.keywords.len()
    );

    Ok(RefinementOutcome {
        document,
        diagnostics: RefinementDiagnostics {
            passes_run: run.passes.len() as u32,
            passes: run.passes,
            stop_reason,
            coverage: keyword_coverage,
            skill_coverage,
        },
    })
}

impl Run<'_> {
    fn current(&self) -> Document {
        self.document
            .clone()
            .unwrap_or_else(|| Document::normalize(""))
    }

    fn next_pass(&mut self, kind: PassKind, instruction: String) -> RefinementPass {
        self.passes.push(kind);
        RefinementPass {
            attempt: self.passes.len() as u32,
            kind,
            instruction,
        }
    }

    /// Checked before every pass after the first. Returns the terminal state
    /// when cancellation or the pass budget forbids another call.
    fn gate(&self) -> Option<State> {
        if self.cancel.is_some_and(|rx| *rx.borrow()) {
            info!("Refinement cancelled after {} pass(es)", self.passes.len());
            return Some(State::Done(Some(StopReason::Cancelled)));
        }
        if self.passes.len() as u32 >= self.budget {
            debug!("Pass budget of {} exhausted", self.budget);
            return Some(State::Done(None));
        }
        None
    }

    async fn send(&self, pass: &RefinementPass, current: &str) -> Result<String, RewriteError> {
        info!("Refinement pass {} ({:?})", pass.attempt, pass.kind);
        let text = self
            .rewriter
            .rewrite(current, &pass.instruction, &self.request.context)
            .await?;
        if text.trim().is_empty() {
            return Err(RewriteError::EmptyContent);
        }
        Ok(text)
    }
}

/// Normalizes a rewrite. Output that normalizes away entirely (a lone title
/// heading, say) is treated as empty.
fn draft(text: &str) -> Result<Document, RewriteError> {
    let document = Document::normalize(text);
    if document.as_str().is_empty() {
        return Err(RewriteError::EmptyContent);
    }
    Ok(document)
}

fn failure(pass: &RefinementPass, error: RewriteError) -> StopReason {
    warn!(
        "Refinement pass {} ({:?}) failed, keeping previous draft: {error}",
        pass.attempt, pass.kind
    );
    StopReason::CollaboratorFailure {
        attempt: pass.attempt,
        message: error.to_string(),
    }
}

/// Takes only the SKILLS section from a backfill rewrite. Anything else the
/// rewriter changed is discarded.
fn splice_skills(current: &Document, rewritten: &str) -> Document {
    let rewritten = Document::normalize(rewritten);
    match rewritten.section(SectionLabel::Skills) {
        Some(skills) => current.replace_section(SectionLabel::Skills, &skills),
        None => {
            warn!("Skill backfill output had no SKILLS section, keeping previous draft");
            current.clone()
        }
    }
}

fn truncate(mut keywords: Vec<String>, limit: usize) -> Vec<String> {
    keywords.truncate(limit);
    keywords
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
