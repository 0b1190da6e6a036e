//! Axum route handlers for the Refinement API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::Document;
use crate::refinement::compare::{compare, Comparison};
use crate::refinement::coverage::coverage;
use crate::refinement::orchestrator::{
    optimize, RefinementConfig, RefinementDiagnostics, RefinementRequest,
};
use crate::refinement::prioritizer::shared_skills;
use crate::refinement::rewriter::JobContext;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub markdown: String,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub markdown: Document,
}

#[derive(Debug, Deserialize)]
pub struct CoverageRequest {
    pub document: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CoverageResponse {
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub ratio: f32,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub original: String,
    pub job_context: JobContext,
    pub keywords: Vec<String>,
    /// Candidate skills; those found in both the original and the job context
    /// become must-include skills.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Lowers the configured pass budget for this request. Never raises it.
    #[serde(default)]
    pub max_passes: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub run_id: Uuid,
    pub document: Document,
    pub diagnostics: RefinementDiagnostics,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub original: String,
    pub optimized: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// When set, optimized lines are also returned with highlights wrapped in
    /// these tags.
    #[serde(default)]
    pub markup: Option<HighlightMarkup>,
}

#[derive(Debug, Deserialize)]
pub struct HighlightMarkup {
    pub open: String,
    pub close: String,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub comparison: Comparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked_optimized: Option<Vec<String>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/refine/normalize
pub async fn handle_normalize(Json(request): Json<NormalizeRequest>) -> Json<NormalizeResponse> {
    Json(NormalizeResponse {
        markdown: Document::normalize(&request.markdown),
    })
}

/// POST /api/v1/refine/coverage
pub async fn handle_coverage(Json(request): Json<CoverageRequest>) -> Json<CoverageResponse> {
    let result = coverage(&request.document, &request.keywords);
    let ratio = result.ratio();
    Json(CoverageResponse {
        present: result.present,
        missing: result.missing,
        ratio,
    })
}

/// POST /api/v1/refine/optimize
///
/// Runs the bounded refinement loop: Boosting → FollowUp → SkillBackfill.
/// Residual coverage gaps are reported in `diagnostics`, never as an error.
/// Only a failed first pass produces an error response.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    if request.original.trim().is_empty() {
        return Err(AppError::Validation("original cannot be empty".to_string()));
    }

    let run_id = Uuid::new_v4();
    let config = RefinementConfig {
        max_passes: request
            .max_passes
            .map_or(state.refinement.max_passes, |m| m.min(state.refinement.max_passes)),
        ..state.refinement
    };

    let must_include_skills = shared_skills(
        &request.original,
        &request.job_context.searchable_text(),
        &request.skills,
    );

    info!(
        "Optimize run {run_id}: {} keywords, {} must-include skills, budget {}",
        request.keywords.len(),
        must_include_skills.len(),
        config.pass_budget()
    );

    let refinement_request = RefinementRequest {
        original: request.original,
        context: request.job_context,
        keywords: request.keywords,
        must_include_skills,
    };

    let outcome = optimize(
        state.rewriter.as_ref(),
        state.prioritizer.as_ref(),
        &refinement_request,
        &config,
        None,
    )
    .await?;

    Ok(Json(OptimizeResponse {
        run_id,
        document: outcome.document,
        diagnostics: outcome.diagnostics,
        completed_at: Utc::now(),
    }))
}

/// POST /api/v1/refine/compare
pub async fn handle_compare(Json(request): Json<CompareRequest>) -> Json<CompareResponse> {
    let comparison = compare(&request.original, &request.optimized, &request.keywords);
    let marked_optimized = request.markup.map(|markup| {
        comparison
            .optimized_lines
            .iter()
            .map(|line| line.render_marked(&markup.open, &markup.close))
            .collect()
    });
    Json(CompareResponse {
        comparison,
        marked_optimized,
    })
}
