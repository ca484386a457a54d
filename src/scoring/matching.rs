use super::types::{MatchResult, SynonymSet, TokenSet};

/// Student tokens that are members of the expert synonym set.
///
/// Exact, case-sensitive membership; order and repeats follow the student tokens.
pub fn match_keywords(student_tokens: &TokenSet, expert_synonyms: &SynonymSet) -> MatchResult {
    MatchResult::new(
        student_tokens
            .iter()
            .filter(|token| expert_synonyms.contains(token))
            .map(str::to_string)
            .collect(),
    )
}
