//! Candidate evaluation: orchestrates one candidate/job pairing end to end.
//!
//! Flow: resolve rubric weights → score categories → overall score → rationale →
//!       tier → insights → breakdown. Batches run sequentially, skip candidates that
//!       fail, then rank.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::insights::extract_insights;
use crate::evaluation::models::{CandidateProfile, EvaluationResult, JobRequirement};
use crate::evaluation::ranking::rank_results;
use crate::evaluation::reasoning::{RationaleContext, RationaleSource};
use crate::evaluation::rubric::{Rubric, Weights};
use crate::evaluation::scoring::{build_breakdown, overall_score, score_categories};
use crate::evaluation::tier::classify_tier;

#[derive(Debug, Clone, Copy)]
pub struct EvaluationOptions {
    /// Let rationale phrases nudge the tier by one step.
    pub reasoning_tier_adjustment: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            reasoning_tier_adjustment: true,
        }
    }
}

/// A candidate left out of a batch, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedCandidate {
    pub index: usize,
    pub candidate: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// Ranked, best first.
    pub results: Vec<EvaluationResult>,
    pub skipped: Vec<SkippedCandidate>,
    pub evaluated: usize,
}

pub struct Evaluator {
    rationale: Arc<dyn RationaleSource>,
    options: EvaluationOptions,
}

impl Evaluator {
    pub fn new(rationale: Arc<dyn RationaleSource>, options: EvaluationOptions) -> Self {
        Self { rationale, options }
    }

    pub fn rationale_source(&self) -> &'static str {
        self.rationale.name()
    }

    pub async fn evaluate(
        &self,
        job: &JobRequirement,
        candidate: &CandidateProfile,
        rubric: &Rubric,
    ) -> Result<EvaluationResult, AppError> {
        let weights = rubric.resolved_weights()?;
        self.evaluate_resolved(job, candidate, rubric, &weights).await
    }

    /// Evaluates every candidate in order. The rubric is validated once, before any
    /// scoring; a single candidate's failure is logged and recorded in `skipped`.
    pub async fn evaluate_batch(
        &self,
        job: &JobRequirement,
        candidates: &[CandidateProfile],
        rubric: &Rubric,
    ) -> Result<BatchOutcome, AppError> {
        let weights = rubric.resolved_weights()?;

        let mut results = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            match self.evaluate_resolved(job, candidate, rubric, &weights).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    let label = candidate
                        .identity()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("#{index}"));
                    warn!(index, candidate = %label, error = %e, "Skipping candidate");
                    skipped.push(SkippedCandidate {
                        index,
                        candidate: label,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let results = rank_results(results);
        info!(
            job_title = %job.job_title,
            evaluated = results.len(),
            skipped = skipped.len(),
            "Batch evaluation complete"
        );

        Ok(BatchOutcome {
            evaluated: results.len(),
            results,
            skipped,
        })
    }

    async fn evaluate_resolved(
        &self,
        job: &JobRequirement,
        candidate: &CandidateProfile,
        rubric: &Rubric,
        weights: &Weights,
    ) -> Result<EvaluationResult, AppError> {
        let candidate_id = candidate
            .identity()
            .ok_or_else(|| AppError::Validation("candidate has neither id nor name".to_string()))?
            .to_string();

        let scores = score_categories(job, candidate, rubric);
        let overall = overall_score(&scores, weights);

        let rationale = self
            .rationale
            .rationale(&RationaleContext {
                job,
                candidate,
                scores: &scores,
                weights,
                overall,
            })
            .await?;

        let verdict_text = self
            .options
            .reasoning_tier_adjustment
            .then_some(rationale.as_str());
        let tier = classify_tier(overall, &scores, verdict_text);
        let insights = extract_insights(&scores, weights, job, candidate);

        info!(
            candidate = %candidate_id,
            overall,
            tier = ?tier,
            source = self.rationale.name(),
            "Candidate evaluated"
        );

        Ok(EvaluationResult {
            evaluation_id: Uuid::new_v4(),
            candidate_id,
            candidate_name: candidate.name.clone(),
            job_title: job.job_title.clone(),
            breakdown: build_breakdown(&scores, weights),
            individual_scores: scores,
            overall_score: overall,
            weights_applied: weights.clone(),
            rationale: Some(rationale),
            tier,
            strengths: insights.strengths,
            weaknesses: insights.weaknesses,
            rank: None,
            evaluated_at: Utc::now(),
        })
    }
}
