//! Category scorers: seven independent 0–100 scores per candidate/job pairing.
//!
//! Every scorer is a pure function over fully-typed records. Missing data degrades to a
//! fixed score instead of failing; `score_categories` additionally replaces any
//! non-finite result with [`NEUTRAL_SCORE`] so one bad category never aborts an evaluation.
//!
//! Overall score = Σ(category_score × weight / 100), rounded to 2 decimals.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::evaluation::models::{
    BreakdownEntry, CandidateProfile, Category, CategoryScores, JobRequirement,
};
use crate::evaluation::rubric::{
    CertificationsCriteria, EducationCriteria, ProjectsCriteria, Rubric, Weights,
};

pub const NEUTRAL_SCORE: f64 = 50.0;

static YEARS_PATTERN: OnceLock<Regex> = OnceLock::new();
static MONTHS_PATTERN: OnceLock<Regex> = OnceLock::new();

// ────────────────────────────────────────────────────────────────────────────
// Set matching
// ────────────────────────────────────────────────────────────────────────────

fn normalized_set(items: &[String]) -> HashSet<String> {
    items
        .iter()
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Number of distinct `required` entries present in `offered`, case-insensitive.
pub fn matched_count(required: &[String], offered: &[String]) -> usize {
    let offered = normalized_set(offered);
    normalized_set(required)
        .iter()
        .filter(|item| offered.contains(*item))
        .count()
}

fn coverage(required: &[String], offered: &[String]) -> f64 {
    let required_count = normalized_set(required).len();
    if required_count == 0 {
        return NEUTRAL_SCORE;
    }
    let matched = matched_count(required, offered) as f64;
    round2((matched / required_count as f64 * 100.0).min(100.0))
}

pub fn score_skills(job: &JobRequirement, candidate: &CandidateProfile) -> f64 {
    coverage(&job.technical_skills, &candidate.technical_skills)
}

pub fn score_tools(job: &JobRequirement, candidate: &CandidateProfile) -> f64 {
    coverage(&job.tools, &candidate.tools)
}

// ────────────────────────────────────────────────────────────────────────────
// Experience
// ────────────────────────────────────────────────────────────────────────────

/// Parses free text like "3 years 6 months", "5+ yrs" or "18 months" into fractional
/// years. The first years fragment and the first months fragment are used; anything
/// unparseable counts as 0.
pub fn extract_years(text: &str) -> f64 {
    let years_re = YEARS_PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)\s*\+?\s*(?:year|yr)").expect("years pattern is valid")
    });
    let months_re = MONTHS_PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:month|mon)").expect("months pattern is valid")
    });

    let lower = text.to_lowercase();
    let first_number = |re: &Regex| {
        re.captures(&lower)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    first_number(years_re) + first_number(months_re) / 12.0
}

pub fn score_experience(job: &JobRequirement, candidate: &CandidateProfile) -> f64 {
    let required = extract_years(&job.required_experience);
    let actual = extract_years(&candidate.total_experience);

    if required <= 0.0 {
        return if actual <= 1.0 { 100.0 } else { 80.0 };
    }

    let ratio = actual / required;
    if ratio >= 1.0 {
        100.0
    } else if ratio >= 0.8 {
        85.0
    } else if ratio >= 0.6 {
        70.0
    } else if ratio >= 0.4 {
        50.0
    } else {
        30.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rubric-driven categories
// ────────────────────────────────────────────────────────────────────────────

/// Looks only at the first (highest) education record. Keyword tiers are checked
/// in priority order and the first hit wins.
pub fn score_education(candidate: &CandidateProfile, criteria: &EducationCriteria) -> f64 {
    let Some(highest) = candidate.education.first() else {
        return if criteria.is_mandatory { 0.0 } else { 30.0 };
    };

    let degree = highest.degree.to_lowercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| degree.contains(k));
    let table = &criteria.scoring;

    if has_any(&["phd", "ph.d", "doctorate", "doctoral"]) {
        table.phd
    } else if has_any(&["master", "mtech", "m.tech"]) {
        table.masters
    } else if has_any(&["bachelor", "btech", "b.tech", "b.e"]) {
        table.bachelors
    } else if has_any(&["diploma"]) {
        table.diploma
    } else {
        table.other
    }
}

pub fn score_projects(candidate: &CandidateProfile, criteria: &ProjectsCriteria) -> f64 {
    let count = u32::try_from(candidate.projects.len()).unwrap_or(u32::MAX);
    let minimum = criteria.minimum_projects;

    if count == 0 {
        0.0
    } else if count >= minimum.saturating_add(3) {
        100.0
    } else if count >= minimum {
        80.0
    } else {
        round2(f64::from(count) / f64::from(minimum) * 60.0)
    }
}

pub fn score_certifications(
    candidate: &CandidateProfile,
    criteria: &CertificationsCriteria,
) -> f64 {
    match candidate.certifications.len() {
        0 if criteria.required => 0.0,
        0 => 30.0,
        n if n >= 4 => 100.0,
        n if n >= 2 => 75.0,
        _ => 50.0,
    }
}

/// Presence (LinkedIn 20, GitHub 20, portfolio 10) plus role fit (up to 50).
pub fn score_profile_quality(job: &JobRequirement, candidate: &CandidateProfile) -> f64 {
    let presence = &candidate.profile;
    let mut score = 0.0;
    if presence.has_linkedin {
        score += 20.0;
    }
    if presence.has_github {
        score += 20.0;
    }
    if presence.has_portfolio {
        score += 10.0;
    }

    let required_roles = normalized_set(&job.required_roles).len();
    let role_fit = if required_roles == 0 {
        25.0
    } else {
        matched_count(&job.required_roles, &candidate.prior_roles) as f64
            / required_roles as f64
            * 50.0
    };

    round2((score + role_fit).min(100.0))
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregation
// ────────────────────────────────────────────────────────────────────────────

/// All seven category scores, each guaranteed finite and within 0–100.
pub fn score_categories(
    job: &JobRequirement,
    candidate: &CandidateProfile,
    rubric: &Rubric,
) -> CategoryScores {
    Category::ALL
        .into_iter()
        .map(|category| {
            let raw = match category {
                Category::Skills => score_skills(job, candidate),
                Category::Tools => score_tools(job, candidate),
                Category::Experience => score_experience(job, candidate),
                Category::Education => score_education(candidate, &rubric.education_criteria),
                Category::Projects => score_projects(candidate, &rubric.projects_criteria),
                Category::Certifications => {
                    score_certifications(candidate, &rubric.certifications_criteria)
                }
                Category::ProfileQuality => score_profile_quality(job, candidate),
            };
            (category, guard(category, raw))
        })
        .collect()
}

fn guard(category: Category, score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        warn!(
            category = category.key(),
            "Category score is not finite, using neutral default"
        );
        NEUTRAL_SCORE
    }
}

/// Weighted sum of category scores. `weights` must already be normalized.
pub fn overall_score(scores: &CategoryScores, weights: &Weights) -> f64 {
    let total: f64 = scores
        .iter()
        .map(|(category, score)| {
            let weight = weights.get(category).copied().unwrap_or(0);
            score * f64::from(weight) / 100.0
        })
        .sum();
    round2(total).clamp(0.0, 100.0)
}

pub fn build_breakdown(scores: &CategoryScores, weights: &Weights) -> Vec<BreakdownEntry> {
    scores
        .iter()
        .map(|(category, score)| {
            let weight = weights.get(category).copied().unwrap_or(0);
            BreakdownEntry {
                category: category.label().to_string(),
                score: round2(*score),
                weight,
                contribution: round2(score * f64::from(weight) / 100.0),
            }
        })
        .collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::models::{EducationRecord, ProfilePresence, ProjectRecord};
    use crate::evaluation::rubric::default_weights;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn job_with_skills(skills: &[&str]) -> JobRequirement {
        JobRequirement {
            technical_skills: strings(skills),
            ..Default::default()
        }
    }

    fn candidate_with_skills(skills: &[&str]) -> CandidateProfile {
        CandidateProfile {
            technical_skills: strings(skills),
            ..Default::default()
        }
    }

    fn with_degree(degree: &str) -> CandidateProfile {
        CandidateProfile {
            education: vec![EducationRecord {
                degree: degree.to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn with_projects(count: usize) -> CandidateProfile {
        CandidateProfile {
            projects: (0..count)
                .map(|i| ProjectRecord {
                    name: format!("project-{i}"),
                    domain: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn with_certifications(count: usize) -> CandidateProfile {
        CandidateProfile {
            certifications: (0..count).map(|i| format!("cert-{i}")).collect(),
            ..Default::default()
        }
    }

    fn experience(required: &str, actual: &str) -> f64 {
        let job = JobRequirement {
            required_experience: required.to_string(),
            ..Default::default()
        };
        let candidate = CandidateProfile {
            total_experience: actual.to_string(),
            ..Default::default()
        };
        score_experience(&job, &candidate)
    }

    #[test]
    fn test_skills_partial_match() {
        let job = job_with_skills(&["python", "sql"]);
        assert_eq!(score_skills(&job, &candidate_with_skills(&["python"])), 50.0);
    }

    #[test]
    fn test_skills_no_candidate_skills() {
        let job = job_with_skills(&["python", "sql"]);
        assert_eq!(score_skills(&job, &candidate_with_skills(&[])), 0.0);
    }

    #[test]
    fn test_skills_no_requirement_is_neutral() {
        let job = job_with_skills(&[]);
        assert_eq!(score_skills(&job, &candidate_with_skills(&["python"])), 50.0);
    }

    #[test]
    fn test_skills_case_and_whitespace_insensitive() {
        let job = job_with_skills(&["Python", " SQL ", "python"]);
        let candidate = candidate_with_skills(&["PYTHON", "sql", "Rust"]);
        assert_eq!(score_skills(&job, &candidate), 100.0);
    }

    #[test]
    fn test_skills_rounded_to_two_decimals() {
        let job = job_with_skills(&["a", "b", "c"]);
        assert_eq!(score_skills(&job, &candidate_with_skills(&["a"])), 33.33);
    }

    #[test]
    fn test_tools_uses_tool_sets() {
        let job = JobRequirement {
            tools: strings(&["Docker", "Kubernetes", "Terraform", "Git"]),
            technical_skills: strings(&["Go"]),
            ..Default::default()
        };
        let candidate = CandidateProfile {
            tools: strings(&["docker", "git", "jira"]),
            ..Default::default()
        };
        assert_eq!(score_tools(&job, &candidate), 50.0);
        assert_eq!(score_skills(&job, &candidate), 0.0);
    }

    #[test]
    fn test_extract_years_fragments() {
        assert_eq!(extract_years("5 years"), 5.0);
        assert_eq!(extract_years("3 years 6 months"), 3.5);
        assert_eq!(extract_years("18 months"), 1.5);
        assert_eq!(extract_years("5+ years"), 5.0);
        assert_eq!(extract_years("2.5 yrs"), 2.5);
        assert_eq!(extract_years("1 Year"), 1.0);
    }

    #[test]
    fn test_extract_years_unparseable_is_zero() {
        assert_eq!(extract_years("Fresher"), 0.0);
        assert_eq!(extract_years(""), 0.0);
        assert_eq!(extract_years("several"), 0.0);
    }

    #[test]
    fn test_experience_bands() {
        assert_eq!(experience("5 years", "5 years"), 100.0);
        assert_eq!(experience("5 years", "7 years"), 100.0);
        assert_eq!(experience("5 years", "4 years"), 85.0);
        assert_eq!(experience("5 years", "3 years"), 70.0);
        assert_eq!(experience("5 years", "2 years"), 50.0);
        assert_eq!(experience("5 years", "1 year"), 30.0);
        assert_eq!(experience("5 years", ""), 30.0);
    }

    #[test]
    fn test_experience_not_required() {
        assert_eq!(experience("Fresher", "6 months"), 100.0);
        assert_eq!(experience("", "1 year"), 100.0);
        assert_eq!(experience("", "4 years"), 80.0);
    }

    #[test]
    fn test_education_without_records() {
        let candidate = CandidateProfile::default();
        let mandatory = EducationCriteria {
            is_mandatory: true,
            ..Default::default()
        };
        assert_eq!(score_education(&candidate, &mandatory), 0.0);
        assert_eq!(score_education(&candidate, &EducationCriteria::default()), 30.0);
    }

    #[test]
    fn test_education_degree_keywords() {
        let criteria = EducationCriteria::default();
        assert_eq!(score_education(&with_degree("Ph.D. Physics"), &criteria), 100.0);
        assert_eq!(
            score_education(&with_degree("Doctoral Degree in Chemistry"), &criteria),
            100.0
        );
        assert_eq!(score_education(&with_degree("M.Tech in CS"), &criteria), 90.0);
        assert_eq!(score_education(&with_degree("Master of Science"), &criteria), 90.0);
        assert_eq!(score_education(&with_degree("B.E. Mechanical"), &criteria), 80.0);
        assert_eq!(score_education(&with_degree("BTech"), &criteria), 80.0);
        assert_eq!(score_education(&with_degree("Diploma in IT"), &criteria), 60.0);
        assert_eq!(score_education(&with_degree("High School"), &criteria), 40.0);
    }

    #[test]
    fn test_education_uses_highest_record_only() {
        let candidate = CandidateProfile {
            education: vec![
                EducationRecord {
                    degree: "Diploma".to_string(),
                    ..Default::default()
                },
                EducationRecord {
                    degree: "PhD".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(score_education(&candidate, &EducationCriteria::default()), 60.0);
    }

    #[test]
    fn test_education_custom_score_table() {
        let mut criteria = EducationCriteria::default();
        criteria.scoring.phd = 95.0;
        assert_eq!(score_education(&with_degree("Doctorate"), &criteria), 95.0);
    }

    #[test]
    fn test_project_bands() {
        let criteria = ProjectsCriteria::default();
        assert_eq!(score_projects(&with_projects(0), &criteria), 0.0);
        assert_eq!(score_projects(&with_projects(1), &criteria), 30.0);
        assert_eq!(score_projects(&with_projects(2), &criteria), 80.0);
        assert_eq!(score_projects(&with_projects(4), &criteria), 80.0);
        assert_eq!(score_projects(&with_projects(5), &criteria), 100.0);
    }

    #[test]
    fn test_project_minimum_from_rubric() {
        let criteria = ProjectsCriteria {
            minimum_projects: 3,
            ..Default::default()
        };
        assert_eq!(score_projects(&with_projects(2), &criteria), 40.0);
        assert_eq!(score_projects(&with_projects(1), &criteria), 20.0);
    }

    #[test]
    fn test_project_minimum_near_u32_max_does_not_overflow() {
        let criteria = ProjectsCriteria {
            minimum_projects: u32::MAX,
            ..Default::default()
        };
        let score = score_projects(&with_projects(2), &criteria);
        assert!(score < 1.0, "score was {score}");
    }

    #[test]
    fn test_certification_bands() {
        let optional = CertificationsCriteria::default();
        let required = CertificationsCriteria {
            required: true,
            ..Default::default()
        };
        assert_eq!(score_certifications(&with_certifications(0), &required), 0.0);
        assert_eq!(score_certifications(&with_certifications(0), &optional), 30.0);
        assert_eq!(score_certifications(&with_certifications(1), &optional), 50.0);
        assert_eq!(score_certifications(&with_certifications(3), &optional), 75.0);
        assert_eq!(score_certifications(&with_certifications(4), &required), 100.0);
    }

    #[test]
    fn test_profile_quality_presence_and_flat_role_fit() {
        let candidate = CandidateProfile {
            profile: ProfilePresence {
                has_linkedin: true,
                has_github: true,
                has_portfolio: true,
            },
            ..Default::default()
        };
        assert_eq!(score_profile_quality(&JobRequirement::default(), &candidate), 75.0);
    }

    #[test]
    fn test_profile_quality_role_overlap() {
        let job = JobRequirement {
            required_roles: strings(&["Data Engineer", "ML Engineer"]),
            ..Default::default()
        };
        let candidate = CandidateProfile {
            prior_roles: strings(&["data engineer", "Analyst"]),
            profile: ProfilePresence {
                has_linkedin: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(score_profile_quality(&job, &candidate), 45.0);
    }

    #[test]
    fn test_score_categories_covers_all_seven() {
        let scores = score_categories(
            &JobRequirement::default(),
            &CandidateProfile::default(),
            &Rubric::default(),
        );
        assert_eq!(scores.len(), 7);
        assert_eq!(scores[&Category::Skills], 50.0);
        assert_eq!(scores[&Category::Experience], 100.0);
        assert_eq!(scores[&Category::Education], 30.0);
        assert_eq!(scores[&Category::Projects], 0.0);
        assert_eq!(scores[&Category::Certifications], 30.0);
        assert_eq!(scores[&Category::ProfileQuality], 25.0);
    }

    #[test]
    fn test_non_finite_category_replaced_with_neutral() {
        let mut rubric = Rubric::default();
        rubric.education_criteria.scoring.masters = f64::NAN;
        let scores = score_categories(
            &JobRequirement::default(),
            &with_degree("Masters in Statistics"),
            &rubric,
        );
        assert_eq!(scores[&Category::Education], NEUTRAL_SCORE);
    }

    #[test]
    fn test_out_of_range_category_is_clamped() {
        let mut rubric = Rubric::default();
        rubric.education_criteria.scoring.bachelors = 130.0;
        let scores = score_categories(
            &JobRequirement::default(),
            &with_degree("Bachelor of Arts"),
            &rubric,
        );
        assert_eq!(scores[&Category::Education], 100.0);
    }

    #[test]
    fn test_overall_score_weighted_sum() {
        let scores: CategoryScores = Category::ALL.into_iter().map(|c| (c, 80.0)).collect();
        assert_eq!(overall_score(&scores, &default_weights()), 80.0);

        let mut scores = scores;
        scores.insert(Category::Skills, 40.0);
        // 80 - 40 * 0.25
        assert_eq!(overall_score(&scores, &default_weights()), 70.0);
    }

    #[test]
    fn test_overall_score_within_bounds() {
        let weights = default_weights();
        for value in [0.0, 12.345, 50.0, 99.999, 100.0] {
            let scores: CategoryScores = Category::ALL.into_iter().map(|c| (c, value)).collect();
            let overall = overall_score(&scores, &weights);
            assert!((0.0..=100.0).contains(&overall), "overall was {overall}");
        }
    }

    #[test]
    fn test_breakdown_entries() {
        let scores: CategoryScores = Category::ALL.into_iter().map(|c| (c, 60.0)).collect();
        let breakdown = build_breakdown(&scores, &default_weights());
        assert_eq!(breakdown.len(), 7);
        assert_eq!(breakdown[0].category, "Skills");
        assert_eq!(breakdown[0].weight, 25);
        assert_eq!(breakdown[0].contribution, 15.0);
        assert_eq!(breakdown[6].category, "Profile Quality");
        assert_eq!(breakdown[6].contribution, 3.0);

        let total: f64 = breakdown.iter().map(|e| e.contribution).sum();
        assert!((total - overall_score(&scores, &default_weights())).abs() < 0.01);
    }
}
