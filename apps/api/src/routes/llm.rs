//! Operational endpoints for the shared LLM client.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SUFFIX;
use crate::llm_client::ClientStatus;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StructuredRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct StructuredResponse {
    pub data: Value,
}

/// GET /api/v1/llm/status
pub async fn handle_status(State(state): State<AppState>) -> Result<Json<ClientStatus>, AppError> {
    Ok(Json(state.llm()?.status().await))
}

/// POST /api/v1/llm/reset
///
/// Manual escape hatch: forgets every recorded call in the budget window.
pub async fn handle_reset(State(state): State<AppState>) -> Result<Json<ClientStatus>, AppError> {
    let llm = state.llm()?;
    llm.reset_budget().await;
    Ok(Json(llm.status().await))
}

/// POST /api/v1/llm/structured
///
/// One budgeted, retried call whose reply is parsed as JSON.
pub async fn handle_structured(
    State(state): State<AppState>,
    Json(request): Json<StructuredRequest>,
) -> Result<Json<StructuredResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let prompt = format!("{}{JSON_ONLY_SUFFIX}", request.prompt.trim());
    let data: Value = state.llm()?.call_json(&prompt).await?;
    Ok(Json(StructuredResponse { data }))
}
