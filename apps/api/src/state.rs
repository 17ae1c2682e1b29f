use std::sync::Arc;

use crate::errors::AppError;
use crate::evaluation::evaluator::Evaluator;
use crate::evaluation::rubric_source::RubricSource;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no provider key is configured; rationales are then local-only.
    pub llm: Option<LlmClient>,
    /// Pluggable rationale source inside. Default: LocalRationale. Swap via ENABLE_LLM_REASONING.
    pub evaluator: Arc<Evaluator>,
    /// FallbackRubrics without a provider, LlmRubrics otherwise.
    pub rubrics: Arc<dyn RubricSource>,
}

impl AppState {
    pub fn llm(&self) -> Result<&LlmClient, AppError> {
        self.llm.as_ref().ok_or(AppError::LlmUnavailable)
    }
}
