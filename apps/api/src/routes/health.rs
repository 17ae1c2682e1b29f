use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and rationale source.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "matcher-api",
        "llm_configured": state.llm.is_some(),
        "rationale_source": state.evaluator.rationale_source(),
        "rubric_source": state.rubrics.name()
    }))
}
