//! Rubric drafting: weights tuned to a job before any candidate is scored.
//!
//! Pluggable via `RubricSource`, carried in `AppState` as `Arc<dyn RubricSource>`:
//! - `FallbackRubrics`: default weights, criteria copied from the job. No provider call.
//! - `LlmRubrics`: provider-tuned weights through `LlmClient`, normalized to 100. Any
//!   provider failure or unusable weight set degrades to the fallback rubric.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::models::{Category, JobRequirement};
use crate::evaluation::prompts::RUBRIC_PROMPT_TEMPLATE;
use crate::evaluation::rubric::{normalize_weights, validate_weights, Rubric, Weights};
use crate::llm_client::LlmClient;

/// A rubric plus where its weights came from.
#[derive(Debug, Clone, Serialize)]
pub struct DraftRubric {
    pub rubric: Rubric,
    /// "llm" | "fallback"
    pub source: &'static str,
    pub reasoning: Option<String>,
}

impl DraftRubric {
    fn fallback(job: &JobRequirement) -> Self {
        Self {
            rubric: Rubric::fallback_for(job),
            source: "fallback",
            reasoning: Some("Fallback rubric with balanced default weights".to_string()),
        }
    }
}

#[async_trait]
pub trait RubricSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn draft(&self, job: &JobRequirement) -> Result<DraftRubric, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// FallbackRubrics
// ────────────────────────────────────────────────────────────────────────────

pub struct FallbackRubrics;

#[async_trait]
impl RubricSource for FallbackRubrics {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn draft(&self, job: &JobRequirement) -> Result<DraftRubric, AppError> {
        Ok(DraftRubric::fallback(job))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmRubrics
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmRubrics(pub LlmClient);

/// What the model is asked to return. Weights may come back fractional or off-total.
#[derive(Debug, Deserialize)]
struct WeightReply {
    weights: BTreeMap<Category, f64>,
    #[serde(default)]
    reasoning: Option<String>,
}

#[async_trait]
impl RubricSource for LlmRubrics {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn draft(&self, job: &JobRequirement) -> Result<DraftRubric, AppError> {
        let prompt = build_rubric_prompt(job)?;

        let reply = match self.0.call_json::<WeightReply>(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Rubric generation failed, using fallback rubric");
                return Ok(DraftRubric::fallback(job));
            }
        };

        let weights = match tuned_weights(&reply.weights) {
            Ok(weights) => weights,
            Err(reason) => {
                warn!(%reason, "Provider weights unusable, using fallback rubric");
                return Ok(DraftRubric::fallback(job));
            }
        };

        let mut rubric = Rubric::fallback_for(job);
        rubric.rubric_name = format!("Generated rubric for {}", title_or_unknown(job));
        rubric.weights = weights;

        info!(rubric = %rubric.rubric_name, "Rubric generated");
        Ok(DraftRubric {
            rubric,
            source: "llm",
            reasoning: reply
                .reasoning
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        })
    }
}

/// Rounds provider weights to integers, then validates and normalizes them to 100.
fn tuned_weights(raw: &BTreeMap<Category, f64>) -> Result<Weights, String> {
    let mut weights = Weights::new();
    for (category, value) in raw {
        if !value.is_finite() || *value < 0.0 {
            return Err(format!("weight for '{}' is {value}", category.key()));
        }
        weights.insert(*category, value.round().min(f64::from(u32::MAX)) as u32);
    }

    validate_weights(&weights).map_err(|e| e.to_string())?;

    let total: u32 = weights.values().sum();
    if total != 100 {
        warn!(total, "Provider weights do not sum to 100, normalizing");
    }
    normalize_weights(&weights).map_err(|e| e.to_string())
}

fn title_or_unknown(job: &JobRequirement) -> &str {
    let title = job.job_title.trim();
    if title.is_empty() {
        "Unknown"
    } else {
        title
    }
}

pub fn build_rubric_prompt(job: &JobRequirement) -> Result<String, AppError> {
    let job_json = serde_json::to_string_pretty(job).map_err(anyhow::Error::from)?;
    Ok(RUBRIC_PROMPT_TEMPLATE
        .replace("{job_title}", title_or_unknown(job))
        .replace("{job_json}", &job_json))
}
