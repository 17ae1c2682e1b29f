//! Axum route handlers for the Evaluation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::evaluation::evaluator::BatchOutcome;
use crate::evaluation::models::{CandidateProfile, EvaluationResult, JobRequirement};
use crate::evaluation::rubric::{normalize_weights, validate_weights, Rubric, Weights};
use crate::evaluation::rubric_source::DraftRubric;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EvaluateBatchRequest {
    pub job: JobRequirement,
    pub candidates: Vec<CandidateProfile>,
    /// Falls back to `Rubric::fallback_for(job)` when absent.
    pub rubric: Option<Rubric>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub job: JobRequirement,
    pub candidate: CandidateProfile,
    pub rubric: Option<Rubric>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WeightsBody {
    pub weights: Weights,
}

#[derive(Debug, Deserialize)]
pub struct RubricRequest {
    pub job: JobRequirement,
}

#[derive(Debug, Serialize)]
pub struct FallbackRubricResponse {
    pub rubric: Rubric,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluations
///
/// Evaluates every candidate against one job, sequentially, and returns them ranked.
/// Candidates that fail are listed under `skipped`; the batch itself only fails on a
/// bad rubric.
pub async fn handle_evaluate_batch(
    State(state): State<AppState>,
    Json(request): Json<EvaluateBatchRequest>,
) -> Result<Json<BatchOutcome>, AppError> {
    if request.candidates.is_empty() {
        return Err(AppError::Validation(
            "candidates cannot be empty".to_string(),
        ));
    }

    let rubric = request
        .rubric
        .unwrap_or_else(|| Rubric::fallback_for(&request.job));

    let outcome = state
        .evaluator
        .evaluate_batch(&request.job, &request.candidates, &rubric)
        .await?;

    Ok(Json(outcome))
}

/// POST /api/v1/evaluations/single
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluationResult>, AppError> {
    let rubric = request
        .rubric
        .unwrap_or_else(|| Rubric::fallback_for(&request.job));

    let result = state
        .evaluator
        .evaluate(&request.job, &request.candidate, &rubric)
        .await?;

    Ok(Json(result))
}

/// POST /api/v1/rubrics/normalize
pub async fn handle_normalize_weights(
    Json(body): Json<WeightsBody>,
) -> Result<Json<WeightsBody>, AppError> {
    validate_weights(&body.weights)?;
    let weights = normalize_weights(&body.weights)?;
    Ok(Json(WeightsBody { weights }))
}

/// POST /api/v1/rubrics/fallback
pub async fn handle_fallback_rubric(
    Json(request): Json<RubricRequest>,
) -> Json<FallbackRubricResponse> {
    Json(FallbackRubricResponse {
        rubric: Rubric::fallback_for(&request.job),
    })
}

/// POST /api/v1/rubrics/generate
///
/// Provider-tuned weights when a provider is configured; the fallback rubric otherwise
/// or whenever the provider's answer is unusable.
pub async fn handle_generate_rubric(
    State(state): State<AppState>,
    Json(request): Json<RubricRequest>,
) -> Result<Json<DraftRubric>, AppError> {
    let draft = state.rubrics.draft(&request.job).await?;
    Ok(Json(draft))
}
