pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::refinement::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/refine/normalize",
            post(handlers::handle_normalize),
        )
        .route("/api/v1/refine/coverage", post(handlers::handle_coverage))
        .route("/api/v1/refine/optimize", post(handlers::handle_optimize))
        .route("/api/v1/refine/compare", post(handlers::handle_compare))
        .with_state(state)
}
