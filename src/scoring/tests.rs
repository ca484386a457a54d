use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::lexicon::MemoryLexicon;
use crate::model::{AnswerExtractor, QaAnswer};

struct StubExtractor;

impl AnswerExtractor for StubExtractor {
    fn infer(&self, _question: &str, context: &str) -> Result<QaAnswer, ScoringError> {
        Ok(QaAnswer {
            answer: context.to_string(),
            score: 0.25,
            start: 0,
            end: context.len(),
        })
    }
}

fn biology_lexicon() -> MemoryLexicon {
    MemoryLexicon::new()
        .with_synset("cell", ["cell"])
        .with_synset("cell", ["cell", "electric_cell"])
        .with_synset("energy", ["energy", "free_energy"])
        .with_synset("energy", ["energy", "vim", "vitality"])
        .with_synset("produce", ["produce", "bring_forth"])
        .with_synset("produce", ["produce", "make", "create"])
        .with_synset("powerhouse", ["powerhouse", "power_station", "power_plant"])
}

fn evaluator() -> AnswerEvaluator {
    AnswerEvaluator::new(
        KeywordExtractor::default(),
        SynonymExpander::new(Arc::new(biology_lexicon())),
        CompletionScorer::new(Arc::new(StubExtractor), Duration::from_secs(5)),
    )
}

fn passage(text: &str) -> Passage {
    Passage::new(text)
}

const PASSAGES: [&str; 5] = [
    "The mitochondria is the powerhouse of the cell",
    "Mitochondria produce energy for the cell",
    "Photosynthesis converts light into chemical energy",
    "cell cell cell",
    "",
];

#[test]
fn test_intent_score_is_symmetric() {
    let vectorizer = TfidfVectorizer::new();
    for p in PASSAGES {
        for q in PASSAGES {
            let forward = intent_score(&vectorizer, p, q);
            let backward = intent_score(&vectorizer, q, p);
            assert!((forward - backward).abs() < 1e-12, "{:?} vs {:?}", p, q);
        }
    }
}

#[test]
fn test_intent_score_of_passage_with_itself_is_one() {
    let vectorizer = TfidfVectorizer::new();
    for p in PASSAGES.iter().filter(|p| !p.is_empty()) {
        assert!((intent_score(&vectorizer, p, p) - 1.0).abs() < 1e-9, "{:?}", p);
    }
}

#[test]
fn test_intent_score_stays_in_unit_interval() {
    let vectorizer = TfidfVectorizer::new();
    for p in PASSAGES {
        for q in PASSAGES {
            let score = intent_score(&vectorizer, p, q);
            assert!((0.0..=1.0).contains(&score));
        }
    }
}

#[test]
fn test_both_empty_yields_defaults() {
    let components = evaluator().evaluate_answer(&passage(""), &passage(""));
    assert!(components.matched_keywords.is_empty());
    assert_eq!(components.intent_score, 0.0);
    assert_eq!(components.completion_score, 0.0);
    assert_eq!(components.degraded.len(), 2);
}

#[test]
fn test_empty_student_yields_defaults() {
    let components = evaluator().evaluate_answer(&passage(""), &passage("Anything"));
    assert!(components.matched_keywords.is_empty());
    assert_eq!(components.intent_score, 0.0);
    assert_eq!(components.completion_score, 0.0);
    assert_eq!(
        components.degraded,
        vec![Degradation::DegenerateInput {
            side: AnswerSide::Student
        }]
    );
}

#[test]
fn test_mitochondria_scenario() {
    let components = evaluator().evaluate_answer(
        &passage("The mitochondria is the powerhouse of the cell"),
        &passage("Mitochondria produce energy for the cell"),
    );

    assert!(components
        .matched_keywords
        .tokens()
        .iter()
        .any(|token| token == "cell"));
    // "mitochondria" and "Mitochondria" differ by case
    assert!(!components
        .matched_keywords
        .tokens()
        .iter()
        .any(|token| token == "mitochondria"));
    assert!(components.intent_score > 0.1 && components.intent_score < 0.9);
    assert_eq!(components.completion_score, 0.25);

    let expected = 0.4 * components.matched_keywords.count() as f64 + 0.3 * 0.25
        + 0.3 * components.intent_score;
    assert!((components.final_score() - expected).abs() < 1e-12);
}

#[test]
fn test_evaluation_is_idempotent() {
    let evaluator = evaluator();
    let student = passage("The mitochondria is the powerhouse of the cell");
    let expert = passage("Mitochondria produce energy for the cell");
    let first = evaluator.evaluate_answer(&student, &expert);
    let second = evaluator.evaluate_answer(&student, &expert);
    assert_eq!(first, second);
}

#[test]
fn test_matched_keywords_bounded_by_student_tokens() {
    let evaluator = evaluator();
    for p in PASSAGES {
        for q in PASSAGES {
            let components = evaluator.evaluate_answer(&passage(p), &passage(q));
            let student_tokens = evaluator.keyword_extractor().extract_keywords(p);
            assert!(components.matched_keywords.count() <= student_tokens.len());
        }
    }
}
