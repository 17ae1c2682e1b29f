use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluation::tier::FitTier;

/// The seven fixed evaluation dimensions. Declaration order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Skills,
    Tools,
    Experience,
    Education,
    Projects,
    Certifications,
    ProfileQuality,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Skills,
        Category::Tools,
        Category::Experience,
        Category::Education,
        Category::Projects,
        Category::Certifications,
        Category::ProfileQuality,
    ];

    /// Categories a candidate cannot compensate for with the rest of the profile.
    pub const CRITICAL: [Category; 3] = [Category::Skills, Category::Tools, Category::Experience];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Skills => "skills",
            Category::Tools => "tools",
            Category::Experience => "experience",
            Category::Education => "education",
            Category::Projects => "projects",
            Category::Certifications => "certifications",
            Category::ProfileQuality => "profile_quality",
        }
    }

    /// Human-readable label used in breakdowns and insight lines.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Skills => "Skills",
            Category::Tools => "Tools",
            Category::Experience => "Experience",
            Category::Education => "Education",
            Category::Projects => "Projects",
            Category::Certifications => "Certifications",
            Category::ProfileQuality => "Profile Quality",
        }
    }
}

pub type CategoryScores = BTreeMap<Category, f64>;

// ────────────────────────────────────────────────────────────────────────────
// Job side
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationRequirement {
    pub is_mandatory: bool,
    pub required_degree: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationRequirement {
    pub required: bool,
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectExpectation {
    pub required: bool,
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRequirements {
    pub linkedin_required: bool,
    pub github_required: bool,
    pub portfolio_required: bool,
}

/// Structured job requirements, as produced upstream from a job description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRequirement {
    pub job_title: String,
    pub technical_skills: Vec<String>,
    pub tools: Vec<String>,
    /// Free text, e.g. "3-5 years" or "Fresher".
    pub required_experience: String,
    pub required_roles: Vec<String>,
    pub education: EducationRequirement,
    pub certifications: CertificationRequirement,
    pub projects: ProjectExpectation,
    pub profile_requirements: ProfileRequirements,
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate side
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationRecord {
    pub degree: String,
    pub institution: Option<String>,
    pub specialization: Option<String>,
    pub year_of_passing: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub name: String,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePresence {
    pub has_linkedin: bool,
    pub has_github: bool,
    pub has_portfolio: bool,
}

/// Structured candidate profile, as produced upstream from a resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub id: Option<String>,
    pub name: String,
    pub technical_skills: Vec<String>,
    pub tools: Vec<String>,
    /// Free text combining years and months, e.g. "3 years 6 months".
    pub total_experience: String,
    /// Highest degree first.
    pub education: Vec<EducationRecord>,
    pub projects: Vec<ProjectRecord>,
    pub certifications: Vec<String>,
    pub profile: ProfilePresence,
    pub prior_roles: Vec<String>,
}

impl CandidateProfile {
    /// Stable identity for reporting: explicit id, else the name.
    pub fn identity(&self) -> Option<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| Some(self.name.trim()).filter(|name| !name.is_empty()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// One row of the score breakdown. Field names are consumed by report exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub category: String,
    pub score: f64,
    pub weight: u32,
    pub contribution: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub evaluation_id: Uuid,
    pub candidate_id: String,
    pub candidate_name: String,
    pub job_title: String,
    pub individual_scores: CategoryScores,
    pub overall_score: f64,
    pub weights_applied: BTreeMap<Category, u32>,
    pub breakdown: Vec<BreakdownEntry>,
    pub rationale: Option<String>,
    pub tier: FitTier,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// Assigned by batch ranking only.
    pub rank: Option<u32>,
    pub evaluated_at: DateTime<Utc>,
}
