use std::sync::Arc;

use crate::refinement::orchestrator::RefinementConfig;
use crate::refinement::prioritizer::KeywordPrioritizer;
use crate::refinement::rewriter::Rewriter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Rewrite collaborator. Production: `LlmClient`.
    pub rewriter: Arc<dyn Rewriter>,
    /// Pluggable keyword prioritizer. Default: `OrderedPrioritizer`.
    pub prioritizer: Arc<dyn KeywordPrioritizer>,
    /// Pass budget and per-pass truncation bounds.
    pub refinement: RefinementConfig,
}
