use serde::{Deserialize, Serialize};

use crate::evaluation::models::{CandidateProfile, Category, CategoryScores, JobRequirement};
use crate::evaluation::rubric::Weights;
use crate::evaluation::scoring::{extract_years, matched_count};

pub const MAX_INSIGHTS: usize = 5;

/// Categories below this weight never produce insight lines.
const MIN_INSIGHT_WEIGHT: u32 = 10;
const STRENGTH_THRESHOLD: f64 = 75.0;
const WEAKNESS_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Category-driven lines first (reporting order), then the skill-count and
/// experience-gap lines. Each list holds 1 to [`MAX_INSIGHTS`] entries.
pub fn extract_insights(
    scores: &CategoryScores,
    weights: &Weights,
    job: &JobRequirement,
    candidate: &CandidateProfile,
) -> Insights {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    for (category, score) in scores {
        let weight = weights.get(category).copied().unwrap_or(0);
        if weight < MIN_INSIGHT_WEIGHT {
            continue;
        }
        if *score >= STRENGTH_THRESHOLD {
            strengths.push(format!("Strong {} match ({score:.0}%)", category.label()));
        }
        if *score < WEAKNESS_THRESHOLD {
            weaknesses.push(format!("Gap in {} ({score:.0}%)", category.label()));
        }
    }

    if scores.get(&Category::Skills).copied().unwrap_or(0.0) >= 70.0 {
        let matched = matched_count(&job.technical_skills, &candidate.technical_skills);
        if matched > 0 {
            strengths.push(format!("Matches {matched} required technical skills"));
        }
    }

    if scores.get(&Category::Experience).copied().unwrap_or(0.0) < 60.0 {
        let required = extract_years(&job.required_experience);
        let actual = extract_years(&candidate.total_experience);
        if actual < required {
            weaknesses.push(format!(
                "Experience gap: {actual:.1} years vs {required:.1} required"
            ));
        }
    }

    Insights {
        strengths: bounded(strengths, "Meets basic requirements"),
        weaknesses: bounded(weaknesses, "No significant gaps identified"),
    }
}

fn bounded(mut lines: Vec<String>, placeholder: &str) -> Vec<String> {
    if lines.is_empty() {
        return vec![placeholder.to_string()];
    }
    lines.truncate(MAX_INSIGHTS);
    lines
}
