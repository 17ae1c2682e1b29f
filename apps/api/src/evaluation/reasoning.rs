//! Rationale generation: the free-text verdict attached to each evaluation.
//!
//! Pluggable via `RationaleSource`, carried by the `Evaluator` as `Arc<dyn RationaleSource>`:
//! - `LocalRationale`: deterministic, score-banded text. No provider call.
//! - `LlmRationale`: provider-written analysis through `LlmClient`; any provider failure
//!   degrades to the local text so one bad call never costs a candidate.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::evaluation::models::{CandidateProfile, Category, CategoryScores, JobRequirement};
use crate::evaluation::prompts::RATIONALE_PROMPT_TEMPLATE;
use crate::evaluation::rubric::Weights;
use crate::llm_client::{sanitize, LlmClient};

/// Everything a rationale source may look at for one candidate.
pub struct RationaleContext<'a> {
    pub job: &'a JobRequirement,
    pub candidate: &'a CandidateProfile,
    pub scores: &'a CategoryScores,
    pub weights: &'a Weights,
    pub overall: f64,
}

#[async_trait]
pub trait RationaleSource: Send + Sync {
    /// "local" | "llm", for logs and status output.
    fn name(&self) -> &'static str;

    async fn rationale(&self, ctx: &RationaleContext<'_>) -> Result<String, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LocalRationale
// ────────────────────────────────────────────────────────────────────────────

pub struct LocalRationale;

#[async_trait]
impl RationaleSource for LocalRationale {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn rationale(&self, ctx: &RationaleContext<'_>) -> Result<String, AppError> {
        Ok(fallback_rationale(ctx.overall, ctx.scores))
    }
}

fn score_of(scores: &CategoryScores, category: Category) -> f64 {
    scores.get(&category).copied().unwrap_or(0.0)
}

/// Three bands: strong (≥75), moderate naming the best category (≥55), limited naming
/// the three weakest categories.
pub fn fallback_rationale(overall: f64, scores: &CategoryScores) -> String {
    if overall >= 75.0 {
        return format!(
            "This candidate demonstrates strong alignment with the role requirements, achieving \
             an overall match score of {overall:.1}%. The profile shows solid technical skills \
             ({:.1}%) and relevant experience ({:.1}%), suggesting a well-rounded professional \
             with the competencies this position needs. Recommendation: Strong candidate for \
             further consideration and interview.",
            score_of(scores, Category::Skills),
            score_of(scores, Category::Experience),
        );
    }

    if overall >= 55.0 {
        let best = scores
            .iter()
            .fold(None, |best: Option<(Category, f64)>, (c, s)| match best {
                Some((_, bs)) if bs >= *s => best,
                _ => Some((*c, *s)),
            });
        let (label, score) = best
            .map(|(c, s)| (c.label().to_lowercase(), s))
            .unwrap_or_else(|| ("no category".to_string(), 0.0));
        return format!(
            "This candidate shows moderate alignment with the role requirements, achieving an \
             overall match score of {overall:.1}%. The clearest strength is {label} \
             ({score:.1}%), while other critical areas show notable gaps. Further assessment is \
             needed to judge whether these gaps can be closed through training or on-the-job \
             learning. Recommendation: Consider for interview with focus on the identified gaps."
        );
    }

    let mut ordered: Vec<(Category, f64)> = scores.iter().map(|(c, s)| (*c, *s)).collect();
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1));
    let weakest = ordered
        .iter()
        .take(3)
        .map(|(c, _)| c.label().to_lowercase())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "This candidate shows limited alignment with the role requirements, achieving an overall \
         match score of {overall:.1}%. Significant gaps exist in multiple critical areas \
         including {weakest}. The candidate may not currently have the foundation this role \
         requires. Recommendation: Not recommended for this position at this time; consider for \
         alternative roles after further skill development."
    )
}

// ────────────────────────────────────────────────────────────────────────────
// LlmRationale
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmRationale(pub LlmClient);

#[async_trait]
impl RationaleSource for LlmRationale {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn rationale(&self, ctx: &RationaleContext<'_>) -> Result<String, AppError> {
        let prompt = build_rationale_prompt(ctx);
        match self.0.call(&prompt).await {
            Ok(text) => match clean_rationale(&text) {
                Some(rationale) => {
                    debug!(chars = rationale.len(), "Provider rationale received");
                    Ok(rationale)
                }
                None => {
                    warn!("Provider returned an empty rationale, using local fallback");
                    Ok(fallback_rationale(ctx.overall, ctx.scores))
                }
            },
            Err(e) => {
                warn!(error = %e, "Rationale call failed, using local fallback");
                Ok(fallback_rationale(ctx.overall, ctx.scores))
            }
        }
    }
}

/// Unwraps a `{"reasoning": ...}` object if the model answered in JSON and drops
/// stray fences. `None` when nothing is left.
fn clean_rationale(raw: &str) -> Option<String> {
    let mut text = raw.trim().to_string();

    if text.starts_with('{') {
        if let Ok(value) = sanitize::parse_structured(&text) {
            if let Some(reasoning) = value.get("reasoning").and_then(|r| r.as_str()) {
                text = reasoning.to_string();
            }
        }
    }

    if text.contains("```") {
        text = text.replace("```", "");
    }

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn listed(items: &[String], limit: usize) -> String {
    if items.is_empty() {
        return "Not specified".to_string();
    }
    items
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn or_na(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() {
        "N/A"
    } else {
        text
    }
}

pub fn build_rationale_prompt(ctx: &RationaleContext<'_>) -> String {
    let score_lines = Category::ALL
        .iter()
        .map(|c| {
            format!(
                "- {}: {:.1}% (Weight: {}%)",
                c.label(),
                score_of(ctx.scores, *c),
                ctx.weights.get(c).copied().unwrap_or(0)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let education = ctx
        .candidate
        .education
        .first()
        .map(|e| e.degree.as_str())
        .unwrap_or("");

    RATIONALE_PROMPT_TEMPLATE
        .replace("{job_title}", or_na(&ctx.job.job_title))
        .replace("{required_experience}", or_na(&ctx.job.required_experience))
        .replace("{job_skills}", &listed(&ctx.job.technical_skills, 5))
        .replace("{job_tools}", &listed(&ctx.job.tools, 5))
        .replace("{candidate_name}", or_na(&ctx.candidate.name))
        .replace("{candidate_experience}", or_na(&ctx.candidate.total_experience))
        .replace("{candidate_education}", or_na(education))
        .replace("{candidate_skills}", &listed(&ctx.candidate.technical_skills, 10))
        .replace("{score_lines}", &score_lines)
        .replace("{overall}", &format!("{:.1}", ctx.overall))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::rubric::default_weights;
    use crate::evaluation::tier::{detect_verdict, Verdict};
    use crate::llm_client::budget::{BudgetConfig, CallBudgetTracker};
    use crate::llm_client::retry::RetryPolicy;
    use crate::llm_client::testing::ScriptedBackend;
    use crate::llm_client::GenerationError;
    use std::sync::Arc;
    use std::time::Duration;

    fn scores(values: [f64; 7]) -> CategoryScores {
        Category::ALL.into_iter().zip(values).collect()
    }

    fn llm(backend: ScriptedBackend) -> LlmRationale {
        let budget = Arc::new(CallBudgetTracker::new(BudgetConfig {
            calls_per_minute: 20,
            min_delay: Duration::ZERO,
        }));
        LlmRationale(LlmClient::new(
            Arc::new(backend),
            budget,
            RetryPolicy::default(),
        ))
    }

    fn context<'a>(
        job: &'a JobRequirement,
        candidate: &'a CandidateProfile,
        scores: &'a CategoryScores,
        weights: &'a Weights,
        overall: f64,
    ) -> RationaleContext<'a> {
        RationaleContext {
            job,
            candidate,
            scores,
            weights,
            overall,
        }
    }

    #[test]
    fn test_fallback_strong_band() {
        let text = fallback_rationale(82.0, &scores([90.0, 80.0, 85.0, 80.0, 80.0, 50.0, 50.0]));
        assert!(text.contains("strong alignment"));
        assert!(text.contains("82.0%"));
        assert!(text.contains("(90.0%)"));
        assert_eq!(detect_verdict(&text), None);
    }

    #[test]
    fn test_fallback_moderate_band_names_best_category() {
        let text = fallback_rationale(60.0, &scores([50.0, 50.0, 70.0, 30.0, 95.0, 30.0, 95.0]));
        assert!(text.contains("moderate alignment"));
        assert!(text.contains("projects (95.0%)"), "{text}");
    }

    #[test]
    fn test_fallback_limited_band_names_three_weakest() {
        let text = fallback_rationale(30.0, &scores([10.0, 60.0, 5.0, 80.0, 20.0, 90.0, 70.0]));
        assert!(text.contains("including experience, skills, projects."), "{text}");
        assert_eq!(detect_verdict(&text), Some(Verdict::Negative));
    }

    #[test]
    fn test_clean_rationale_unwraps_json_and_fences() {
        assert_eq!(
            clean_rationale("{\"reasoning\": \"Strong hire.\"}").as_deref(),
            Some("Strong hire.")
        );
        assert_eq!(
            clean_rationale("```\nSolid match overall.\n```").as_deref(),
            Some("Solid match overall.")
        );
        assert_eq!(clean_rationale("  ``` ```  "), None);
    }

    #[test]
    fn test_prompt_fills_every_placeholder() {
        let job = JobRequirement {
            job_title: "Platform Engineer".to_string(),
            technical_skills: vec!["Rust".to_string(), "Go".to_string()],
            ..Default::default()
        };
        let candidate = CandidateProfile {
            name: "Mei".to_string(),
            ..Default::default()
        };
        let s = scores([50.0; 7]);
        let w = default_weights();
        let prompt = build_rationale_prompt(&context(&job, &candidate, &s, &w, 50.0));

        assert!(prompt.contains("Position: Platform Engineer"));
        assert!(prompt.contains("Key Skills: Rust, Go"));
        assert!(prompt.contains("Tools: Not specified"));
        assert!(prompt.contains("Education: N/A"));
        assert!(prompt.contains("- Profile Quality: 50.0% (Weight: 5%)"));
        assert!(prompt.contains("OVERALL SCORE: 50.0%"));
        assert!(!prompt.contains('{'), "unfilled placeholder in:\n{prompt}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_llm_rationale_returns_provider_text() {
        let source = llm(ScriptedBackend::new(vec![Ok(
            "  Excellent fit. Strong hire.  ".to_string()
        )]));
        let (job, candidate) = (JobRequirement::default(), CandidateProfile::default());
        let (s, w) = (scores([80.0; 7]), default_weights());
        let text = source
            .rationale(&context(&job, &candidate, &s, &w, 80.0))
            .await
            .unwrap();
        assert_eq!(text, "Excellent fit. Strong hire.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_llm_rationale_falls_back_on_provider_failure() {
        let source = llm(ScriptedBackend::new(vec![Err(GenerationError::Fatal(
            "invalid api key".to_string(),
        ))]));
        let (job, candidate) = (JobRequirement::default(), CandidateProfile::default());
        let (s, w) = (scores([20.0; 7]), default_weights());
        let text = source
            .rationale(&context(&job, &candidate, &s, &w, 20.0))
            .await
            .unwrap();
        assert_eq!(text, fallback_rationale(20.0, &s));
    }
}
