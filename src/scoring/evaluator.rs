use std::time::Instant;
use tracing::{debug, warn};

use super::completion::{CompletionOutcome, CompletionScorer};
use super::error::{AnswerSide, Degradation, ScoringError};
use super::intent::{intent_score, TfidfVectorizer};
use super::keywords::KeywordExtractor;
use super::matching::match_keywords;
use super::synonyms::{LemmaFilter, SynonymExpander};
use super::types::{MatchResult, Passage, ScoreComponents, ScoredAnswer};
use crate::TARGET_SCORING;

/// Scores student answers against expert answers.
///
/// Holds the shared read-only resources; every evaluation builds its own
/// token sets, synonym set and TF-IDF space.
#[derive(Clone)]
pub struct AnswerEvaluator {
    keywords: KeywordExtractor,
    synonyms: SynonymExpander,
    lemma_filter: LemmaFilter,
    vectorizer: TfidfVectorizer,
    completion: CompletionScorer,
}

impl AnswerEvaluator {
    pub fn new(
        keywords: KeywordExtractor,
        synonyms: SynonymExpander,
        completion: CompletionScorer,
    ) -> Self {
        Self {
            keywords,
            synonyms,
            lemma_filter: LemmaFilter::scoring(),
            vectorizer: TfidfVectorizer::new(),
            completion,
        }
    }

    pub fn with_lemma_filter(mut self, filter: LemmaFilter) -> Self {
        self.lemma_filter = filter;
        self
    }

    pub fn with_vectorizer(mut self, vectorizer: TfidfVectorizer) -> Self {
        self.vectorizer = vectorizer;
        self
    }

    pub fn keyword_extractor(&self) -> &KeywordExtractor {
        &self.keywords
    }

    pub fn synonym_expander(&self) -> &SynonymExpander {
        &self.synonyms
    }

    pub fn completion_scorer(&self) -> &CompletionScorer {
        &self.completion
    }

    /// Turn optional raw texts into passages.
    ///
    /// A single missing side is read as empty; both missing is an evaluation failure.
    pub fn resolve_passages(
        student: Option<&str>,
        expert: Option<&str>,
    ) -> Result<(Passage, Passage), ScoringError> {
        if student.is_none() && expert.is_none() {
            return Err(ScoringError::EvaluationFailed(
                "both student and expert answers are missing".to_string(),
            ));
        }
        Ok((
            Passage::new(student.unwrap_or_default()),
            Passage::new(expert.unwrap_or_default()),
        ))
    }

    fn degenerate_notes(student: &Passage, expert: &Passage) -> Vec<Degradation> {
        let mut notes = Vec::new();
        if student.is_blank() {
            notes.push(Degradation::DegenerateInput {
                side: AnswerSide::Student,
            });
        }
        if expert.is_blank() {
            notes.push(Degradation::DegenerateInput {
                side: AnswerSide::Expert,
            });
        }
        notes
    }

    /// Keyword match and intent similarity, the two model-free signals.
    fn lexical_signals(&self, student: &Passage, expert: &Passage) -> (MatchResult, f64) {
        let student_tokens = self.keywords.extract_keywords(student.as_str());
        let expert_tokens = self.keywords.extract_keywords(expert.as_str());
        let expert_synonyms = self
            .synonyms
            .expand_synonyms(&expert_tokens, &self.lemma_filter);
        let matched = match_keywords(&student_tokens, &expert_synonyms);
        let intent = intent_score(&self.vectorizer, student.as_str(), expert.as_str());
        (matched, intent)
    }

    fn assemble(matched: MatchResult, intent: f64, completion: CompletionOutcome) -> ScoreComponents {
        let components = ScoreComponents {
            matched_keywords: matched,
            intent_score: intent,
            completion_score: completion.score,
            degraded: completion.degradation.into_iter().collect(),
        };
        debug!(
            target: TARGET_SCORING,
            "Scored answer: {} matched keywords {:?}, intent {:.4}, completion {:.4}",
            components.matched_keywords.count(),
            components.matched_keywords.tokens(),
            components.intent_score,
            components.completion_score
        );
        components
    }

    /// Evaluate one pair, running QA inference on the calling thread.
    pub fn evaluate_answer(&self, student: &Passage, expert: &Passage) -> ScoreComponents {
        let notes = Self::degenerate_notes(student, expert);
        if !notes.is_empty() {
            debug!(target: TARGET_SCORING, "Degenerate input: {:?}", notes);
            return ScoreComponents::degenerate(notes);
        }

        let start = Instant::now();
        let (matched, intent) = self.lexical_signals(student, expert);
        let completion = self.completion.completion_score(student, expert);
        let components = Self::assemble(matched, intent, completion);
        debug!(target: TARGET_SCORING, "Evaluation took {:?}", start.elapsed());
        components
    }

    /// Evaluate one pair with QA inference on the blocking pool, bounded by the
    /// inference timeout.
    pub async fn evaluate(&self, student: &Passage, expert: &Passage) -> ScoreComponents {
        let notes = Self::degenerate_notes(student, expert);
        if !notes.is_empty() {
            debug!(target: TARGET_SCORING, "Degenerate input: {:?}", notes);
            return ScoreComponents::degenerate(notes);
        }

        let start = Instant::now();
        let (matched, intent) = self.lexical_signals(student, expert);
        let completion = self
            .completion
            .completion_score_with_timeout(student, expert)
            .await;
        let components = Self::assemble(matched, intent, completion);
        debug!(target: TARGET_SCORING, "Evaluation took {:?}", start.elapsed());
        components
    }

    /// Validate optional raw texts and evaluate them.
    pub fn evaluate_texts(
        &self,
        student: Option<&str>,
        expert: Option<&str>,
    ) -> Result<ScoreComponents, ScoringError> {
        let (student, expert) = Self::resolve_passages(student, expert)?;
        Ok(self.evaluate_answer(&student, &expert))
    }

    /// Pair the lines of the two passages by position and score each pair.
    /// Lines beyond the shorter side are ignored.
    pub async fn evaluate_batch(&self, students: &Passage, experts: &Passage) -> Vec<ScoredAnswer> {
        let student_lines: Vec<Passage> = students.lines().collect();
        let expert_lines: Vec<Passage> = experts.lines().collect();
        if student_lines.len() != expert_lines.len() {
            warn!(
                target: TARGET_SCORING,
                "Batch has {} student lines and {} expert lines, scoring {} pairs",
                student_lines.len(),
                expert_lines.len(),
                student_lines.len().min(expert_lines.len())
            );
        }

        let mut results = Vec::with_capacity(student_lines.len().min(expert_lines.len()));
        for (student, expert) in student_lines.iter().zip(&expert_lines) {
            results.push(ScoredAnswer::from(self.evaluate(student, expert).await));
        }
        results
    }
}
