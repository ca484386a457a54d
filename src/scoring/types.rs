use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use super::error::{Degradation, ScoringError};

/// A unit of natural-language text submitted for scoring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Passage(String);

impl Passage {
    /// Wrap `text` as a passage. Any string is accepted, control characters
    /// such as the form feeds left by PDF extraction included.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Decode raw bytes as a UTF-8 passage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScoringError> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ScoringError::InvalidInput(format!("passage is not valid UTF-8: {}", e))
        })?;
        Ok(Self::new(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the passage has no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Split on `\n` into one passage per line, dropping a trailing `\r`.
    pub fn lines(&self) -> impl Iterator<Item = Passage> + '_ {
        self.0
            .split('\n')
            .map(|line| Passage(line.trim_end_matches('\r').to_string()))
    }
}

impl fmt::Display for Passage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content tokens of a passage in document order, case preserved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TokenSet(Vec<String>);

impl TokenSet {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TokenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Set of synonymous surface forms. Membership is exact string equality;
/// iteration follows first insertion order.
#[derive(Debug, Clone, Default)]
pub struct SynonymSet {
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl SynonymSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `lemma`; returns false when it was already present.
    pub fn insert(&mut self, lemma: &str) -> bool {
        if self.members.contains(lemma) {
            return false;
        }
        self.members.insert(lemma.to_string());
        self.ordered.push(lemma.to_string());
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.members.contains(word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ordered.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn union_with(&mut self, other: &SynonymSet) {
        for lemma in other.iter() {
            self.insert(lemma);
        }
    }
}

impl<'a> FromIterator<&'a str> for SynonymSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = SynonymSet::new();
        for lemma in iter {
            set.insert(lemma);
        }
        set
    }
}

/// Student tokens found in the expert synonym set, in student order with repeats.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct MatchResult(Vec<String>);

impl MatchResult {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.0
    }
}

/// The three sub-signals of one (student, expert) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponents {
    pub matched_keywords: MatchResult,
    pub intent_score: f64,
    pub completion_score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<Degradation>,
}

impl ScoreComponents {
    /// Components of an evaluation where nothing could be compared.
    pub fn degenerate(degraded: Vec<Degradation>) -> Self {
        Self {
            matched_keywords: MatchResult::default(),
            intent_score: 0.0,
            completion_score: 0.0,
            degraded,
        }
    }

    pub fn final_score(&self) -> f64 {
        super::aggregate::aggregate(
            &self.matched_keywords,
            self.completion_score,
            self.intent_score,
        )
    }
}

/// Score components together with their aggregated final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredAnswer {
    #[serde(flatten)]
    pub components: ScoreComponents,
    pub final_score: f64,
}

impl From<ScoreComponents> for ScoredAnswer {
    fn from(components: ScoreComponents) -> Self {
        let final_score = components.final_score();
        Self {
            components,
            final_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_validation() {
        assert_eq!(
            Passage::new("The cell wall\tis rigid.\n").as_str(),
            "The cell wall\tis rigid.\n"
        );
        assert!(matches!(
            Passage::from_bytes(&[0x66, 0x6f, 0xff]),
            Err(ScoringError::InvalidInput(_))
        ));
        assert!(Passage::new("   \n").is_blank());
    }

    #[test]
    fn test_passage_keeps_control_characters() {
        let text = "Mitochondria produce energy.\u{c}Page 2: the cell";
        assert_eq!(Passage::new(text).as_str(), text);
        let decoded = Passage::from_bytes("cell\u{b}wall".as_bytes()).unwrap();
        assert_eq!(decoded.as_str(), "cell\u{b}wall");
        assert!(!Passage::new("\u{c}cell").is_blank());
    }

    #[test]
    fn test_passage_lines() {
        let passage = Passage::new("first\r\nsecond\n");
        let lines: Vec<String> = passage.lines().map(|p| p.to_string()).collect();
        assert_eq!(lines, vec!["first", "second", ""]);
    }

    #[test]
    fn test_synonym_set_keeps_first_seen_order() {
        let set: SynonymSet = ["make", "create", "make", "produce"].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["make", "create", "produce"]);
        assert!(set.contains("create"));
        assert!(!set.contains("Create"));
    }

    #[test]
    fn test_scored_answer_serializes_flat() {
        let components = ScoreComponents {
            matched_keywords: MatchResult::new(vec!["cell".to_string()]),
            intent_score: 0.5,
            completion_score: 0.0,
            degraded: Vec::new(),
        };
        let json = serde_json::to_value(ScoredAnswer::from(components)).unwrap();
        assert_eq!(json["matched_keywords"], serde_json::json!(["cell"]));
        assert!(json.get("degraded").is_none());
        assert!((json["final_score"].as_f64().unwrap() - 0.55).abs() < 1e-9);
    }
}
