use super::types::MatchResult;

// Process-wide weights; they sum to 1.0.
pub const WEIGHT_KEYWORDS: f64 = 0.4;
pub const WEIGHT_COMPLETION: f64 = 0.3;
pub const WEIGHT_INTENT: f64 = 0.3;

/// Weighted sum of the three signals.
///
/// The keyword term is the raw match count, not a ratio, so it is unbounded
/// while the other two terms lie in [0, 1].
pub fn calculate_score(matched_keywords_count: usize, completion_score: f64, intent_score: f64) -> f64 {
    WEIGHT_KEYWORDS * matched_keywords_count as f64
        + WEIGHT_COMPLETION * completion_score
        + WEIGHT_INTENT * intent_score
}

pub fn aggregate(matched: &MatchResult, completion: f64, intent: f64) -> f64 {
    calculate_score(matched.count(), completion, intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        assert!((WEIGHT_KEYWORDS + WEIGHT_COMPLETION + WEIGHT_INTENT - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate(&MatchResult::default(), 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_aggregate_is_linear_in_completion() {
        let matched = MatchResult::new(vec!["cell".to_string(), "energy".to_string()]);
        let base = aggregate(&matched, 0.25, 0.6);
        let doubled = aggregate(&matched, 0.5, 0.6);
        assert!((doubled - base - 0.3 * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_keyword_count_is_unnormalised() {
        assert!((calculate_score(5, 1.0, 1.0) - 2.6).abs() < 1e-12);
        assert!((calculate_score(1, 0.0, 0.0) - 0.4).abs() < 1e-12);
    }
}
