use crate::evaluation::models::EvaluationResult;

/// Orders by overall score, highest first, and assigns 1-based positional ranks.
/// The sort is stable: tied scores keep their submission order and still get distinct ranks.
pub fn rank_results(mut results: Vec<EvaluationResult>) -> Vec<EvaluationResult> {
    results.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    for (position, result) in results.iter_mut().enumerate() {
        result.rank = Some(position as u32 + 1);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::models::CategoryScores;
    use crate::evaluation::rubric::default_weights;
    use crate::evaluation::tier::FitTier;
    use chrono::Utc;
    use uuid::Uuid;

    fn result(id: &str, overall: f64) -> EvaluationResult {
        EvaluationResult {
            evaluation_id: Uuid::new_v4(),
            candidate_id: id.to_string(),
            candidate_name: id.to_string(),
            job_title: "Backend Engineer".to_string(),
            individual_scores: CategoryScores::new(),
            overall_score: overall,
            weights_applied: default_weights(),
            breakdown: Vec::new(),
            rationale: None,
            tier: FitTier::from_score(overall),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            rank: None,
            evaluated_at: Utc::now(),
        }
    }

    fn ids(results: &[EvaluationResult]) -> Vec<&str> {
        results.iter().map(|r| r.candidate_id.as_str()).collect()
    }

    fn ranks(results: &[EvaluationResult]) -> Vec<Option<u32>> {
        results.iter().map(|r| r.rank).collect()
    }

    #[test]
    fn test_ties_are_stable_and_dense() {
        let ranked = rank_results(vec![result("a", 90.0), result("b", 90.0), result("c", 70.0)]);
        assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
        assert_eq!(ranks(&ranked), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_sorted_descending() {
        let ranked = rank_results(vec![
            result("low", 12.5),
            result("top", 88.0),
            result("mid", 55.25),
            result("tied-mid", 55.25),
        ]);
        assert_eq!(ids(&ranked), vec!["top", "mid", "tied-mid", "low"]);
        assert_eq!(ranks(&ranked), vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_scores_untouched() {
        let ranked = rank_results(vec![result("x", 40.0), result("y", 60.0)]);
        assert_eq!(ranked[0].overall_score, 60.0);
        assert_eq!(ranked[1].overall_score, 40.0);
        assert_eq!(ranked[0].tier, FitTier::Best);
    }

    #[test]
    fn test_empty_batch() {
        assert!(rank_results(Vec::new()).is_empty());
    }
}
