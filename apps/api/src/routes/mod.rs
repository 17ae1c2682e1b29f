pub mod health;
pub mod llm;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Evaluation API
        .route("/api/v1/evaluations", post(handlers::handle_evaluate_batch))
        .route(
            "/api/v1/evaluations/single",
            post(handlers::handle_evaluate),
        )
        .route(
            "/api/v1/rubrics/normalize",
            post(handlers::handle_normalize_weights),
        )
        .route(
            "/api/v1/rubrics/fallback",
            post(handlers::handle_fallback_rubric),
        )
        .route(
            "/api/v1/rubrics/generate",
            post(handlers::handle_generate_rubric),
        )
        // LLM client operations
        .route("/api/v1/llm/status", get(llm::handle_status))
        .route("/api/v1/llm/reset", post(llm::handle_reset))
        .route("/api/v1/llm/structured", post(llm::handle_structured))
        .with_state(state)
}
