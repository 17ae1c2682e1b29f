//! Rubrics: category weights plus the per-category criteria the scorers read.
//!
//! Weights are integers and must sum to exactly 100 before an overall score is computed.
//! `normalize_weights` rescales anything else proportionally and hands the rounding
//! remainder to the heaviest category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::evaluation::models::{Category, JobRequirement};

pub type Weights = BTreeMap<Category, u32>;

/// Balanced default: critical categories carry 70%.
pub const DEFAULT_WEIGHTS: [(Category, u32); 7] = [
    (Category::Skills, 25),
    (Category::Tools, 25),
    (Category::Experience, 20),
    (Category::Education, 5),
    (Category::Projects, 15),
    (Category::Certifications, 5),
    (Category::ProfileQuality, 5),
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RubricError {
    #[error("rubric has no weight for category '{0}'")]
    MissingCategory(&'static str),

    #[error("weight for '{category}' is {weight}, must be within 0-100")]
    WeightOutOfRange { category: &'static str, weight: u32 },

    #[error("rubric weights sum to zero")]
    ZeroSum,

    #[error("minimum_match_percentage must be within 0-100, got {0}")]
    InvalidMatchPercentage(f64),
}

pub fn default_weights() -> Weights {
    DEFAULT_WEIGHTS.into_iter().collect()
}

/// Rescales `weights` to sum to exactly 100. Idempotent.
pub fn normalize_weights(weights: &Weights) -> Result<Weights, RubricError> {
    let total: u64 = weights.values().map(|w| u64::from(*w)).sum();
    if total == 0 {
        return Err(RubricError::ZeroSum);
    }
    if total == 100 {
        return Ok(weights.clone());
    }

    // Round half up: (2 * w * 100 + total) / (2 * total)
    let mut normalized: Weights = weights
        .iter()
        .map(|(category, w)| {
            let scaled = (2 * u64::from(*w) * 100 + total) / (2 * total);
            (*category, scaled as u32)
        })
        .collect();

    let sum: i64 = normalized.values().map(|w| i64::from(*w)).sum();
    let remainder = 100 - sum;
    if remainder != 0 {
        // First category in reporting order wins ties.
        let heaviest = normalized
            .iter()
            .fold(None, |best: Option<(Category, u32)>, (c, w)| match best {
                Some((_, bw)) if bw >= *w => best,
                _ => Some((*c, *w)),
            })
            .map(|(c, _)| c);

        if let Some(category) = heaviest {
            if let Some(weight) = normalized.get_mut(&category) {
                *weight = (i64::from(*weight) + remainder).max(0) as u32;
            }
        }
    }

    Ok(normalized)
}

/// Every category present, each weight within 0-100, and a non-zero total.
pub fn validate_weights(weights: &Weights) -> Result<(), RubricError> {
    if let Some(missing) = Category::ALL.iter().find(|c| !weights.contains_key(*c)) {
        return Err(RubricError::MissingCategory(missing.key()));
    }
    if let Some((category, weight)) = weights.iter().find(|(_, w)| **w > 100) {
        return Err(RubricError::WeightOutOfRange {
            category: category.key(),
            weight: *weight,
        });
    }
    if weights.values().all(|w| *w == 0) {
        return Err(RubricError::ZeroSum);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsCriteria {
    pub minimum_match_percentage: f64,
}

impl Default for SkillsCriteria {
    fn default() -> Self {
        Self {
            minimum_match_percentage: 60.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceCriteria {
    /// Free text as written in the job, e.g. "3-5 years".
    pub required_years: Option<String>,
    pub required_roles: Vec<String>,
}

/// Score awarded per highest degree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DegreeScores {
    pub phd: f64,
    pub masters: f64,
    pub bachelors: f64,
    pub diploma: f64,
    pub other: f64,
}

impl Default for DegreeScores {
    fn default() -> Self {
        Self {
            phd: 100.0,
            masters: 90.0,
            bachelors: 80.0,
            diploma: 60.0,
            other: 40.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationCriteria {
    pub is_mandatory: bool,
    pub required_degree: Option<String>,
    pub scoring: DegreeScores,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsCriteria {
    pub required: bool,
    pub expected_domains: Vec<String>,
    pub minimum_projects: u32,
}

impl Default for ProjectsCriteria {
    fn default() -> Self {
        Self {
            required: false,
            expected_domains: Vec::new(),
            minimum_projects: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationsCriteria {
    pub required: bool,
    pub preferred_certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileCriteria {
    pub linkedin_required: bool,
    pub github_required: bool,
    pub portfolio_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Rubric {
    pub rubric_name: String,
    pub weights: Weights,
    pub skills_criteria: SkillsCriteria,
    pub experience_criteria: ExperienceCriteria,
    pub education_criteria: EducationCriteria,
    pub projects_criteria: ProjectsCriteria,
    pub certifications_criteria: CertificationsCriteria,
    pub profile_criteria: ProfileCriteria,
}

impl Default for Rubric {
    fn default() -> Self {
        Self {
            rubric_name: "Default rubric".to_string(),
            weights: default_weights(),
            skills_criteria: SkillsCriteria::default(),
            experience_criteria: ExperienceCriteria::default(),
            education_criteria: EducationCriteria::default(),
            projects_criteria: ProjectsCriteria::default(),
            certifications_criteria: CertificationsCriteria::default(),
            profile_criteria: ProfileCriteria::default(),
        }
    }
}

impl Rubric {
    /// Rubric used when the caller supplies none: default weights, criteria flags
    /// copied from the job.
    pub fn fallback_for(job: &JobRequirement) -> Self {
        let title = if job.job_title.trim().is_empty() {
            "Unknown"
        } else {
            job.job_title.trim()
        };

        Self {
            rubric_name: format!("Fallback rubric for {title}"),
            weights: default_weights(),
            skills_criteria: SkillsCriteria::default(),
            experience_criteria: ExperienceCriteria {
                required_years: Some(job.required_experience.trim())
                    .filter(|years| !years.is_empty())
                    .map(str::to_string),
                required_roles: job.required_roles.clone(),
            },
            education_criteria: EducationCriteria {
                is_mandatory: job.education.is_mandatory,
                required_degree: job.education.required_degree.clone(),
                scoring: DegreeScores::default(),
            },
            projects_criteria: ProjectsCriteria {
                required: job.projects.required,
                expected_domains: job.projects.domains.clone(),
                ..ProjectsCriteria::default()
            },
            certifications_criteria: CertificationsCriteria {
                required: job.certifications.required,
                preferred_certifications: job.certifications.list.clone(),
            },
            profile_criteria: ProfileCriteria {
                linkedin_required: job.profile_requirements.linkedin_required,
                github_required: job.profile_requirements.github_required,
                portfolio_required: job.profile_requirements.portfolio_required,
            },
        }
    }

    /// Validates the rubric and returns weights guaranteed to sum to 100.
    /// Raised before any scoring starts; never silently defaulted.
    pub fn resolved_weights(&self) -> Result<Weights, RubricError> {
        validate_weights(&self.weights)?;

        let pct = self.skills_criteria.minimum_match_percentage;
        if !(0.0..=100.0).contains(&pct) {
            return Err(RubricError::InvalidMatchPercentage(pct));
        }

        let total: u64 = self.weights.values().map(|w| u64::from(*w)).sum();
        if total != 100 {
            warn!(
                rubric = %self.rubric_name,
                total,
                "Rubric weights do not sum to 100, normalizing"
            );
        }
        normalize_weights(&self.weights)
    }
}
