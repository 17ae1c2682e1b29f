use serde::{Deserialize, Serialize};

use crate::evaluation::models::{Category, CategoryScores};

/// Ordinal fit classification, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitTier {
    VeryLow,
    Low,
    Moderate,
    Best,
    Top,
}

impl FitTier {
    pub fn from_score(overall: f64) -> Self {
        if overall >= 80.0 {
            FitTier::Top
        } else if overall >= 60.0 {
            FitTier::Best
        } else if overall >= 40.0 {
            FitTier::Moderate
        } else if overall >= 20.0 {
            FitTier::Low
        } else {
            FitTier::VeryLow
        }
    }

    pub fn step_up(self) -> Self {
        match self {
            FitTier::VeryLow => FitTier::Low,
            FitTier::Low => FitTier::Moderate,
            FitTier::Moderate => FitTier::Best,
            FitTier::Best | FitTier::Top => FitTier::Top,
        }
    }

    pub fn step_down(self) -> Self {
        match self {
            FitTier::Top => FitTier::Best,
            FitTier::Best => FitTier::Moderate,
            FitTier::Moderate => FitTier::Low,
            FitTier::Low | FitTier::VeryLow => FitTier::VeryLow,
        }
    }
}

/// Recommendation signalled by free-text rationale. Best-effort phrase matching only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Positive,
    Negative,
}

const POSITIVE_PHRASES: [&str; 2] = ["strong hire", "excellent fit"];
const NEGATIVE_PHRASES: [&str; 3] = ["not recommended", "poor fit", "limited alignment"];

/// `None` when the text carries no phrase or carries both kinds.
pub fn detect_verdict(rationale: &str) -> Option<Verdict> {
    let lower = rationale.to_lowercase();
    let positive = POSITIVE_PHRASES.iter().any(|p| lower.contains(p));
    let negative = NEGATIVE_PHRASES.iter().any(|p| lower.contains(p));

    match (positive, negative) {
        (true, false) => Some(Verdict::Positive),
        (false, true) => Some(Verdict::Negative),
        _ => None,
    }
}

/// Mean of skills, tools and experience. Missing categories count as 0.
pub fn critical_average(scores: &CategoryScores) -> f64 {
    let sum: f64 = Category::CRITICAL
        .iter()
        .map(|c| scores.get(c).copied().unwrap_or(0.0))
        .sum();
    sum / Category::CRITICAL.len() as f64
}

/// Threshold tier, then the critical-category safeguard, then an optional
/// one-step verdict adjustment. Pass `None` to keep classification deterministic.
pub fn classify_tier(overall: f64, scores: &CategoryScores, rationale: Option<&str>) -> FitTier {
    let base = FitTier::from_score(overall);
    let critical = critical_average(scores);

    let mut safeguarded = false;
    let mut tier = base;
    if critical < 50.0 && tier >= FitTier::Best {
        tier = FitTier::Moderate;
        safeguarded = true;
    } else if critical < 30.0 && tier == FitTier::Moderate {
        tier = FitTier::Low;
        safeguarded = true;
    }

    let Some(verdict) = rationale.and_then(detect_verdict) else {
        return tier;
    };

    match verdict {
        Verdict::Positive if !safeguarded => {
            let target = if overall >= 70.0 {
                FitTier::Top
            } else if overall >= 60.0 {
                FitTier::Best
            } else {
                return tier;
            };
            if target > tier {
                tier.step_up()
            } else {
                tier
            }
        }
        Verdict::Positive => tier,
        Verdict::Negative => {
            let target = if overall < 50.0 {
                FitTier::Low
            } else {
                FitTier::Moderate
            };
            if target < tier {
                tier.step_down()
            } else {
                tier
            }
        }
    }
}
