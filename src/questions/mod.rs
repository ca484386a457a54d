//! Question records and distractor generation.
//!
//! Question generation itself is delegated to a [`QuestionFactory`].

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scoring::{LemmaFilter, SynonymExpander};
use crate::TARGET_SCORING;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    ShortDescription,
    LongDescription,
    CaseStudy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub kind: QuestionKind,
    pub question: String,
    /// Answer choices; empty unless the question is multiple choice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Number of questions wanted per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub multiple_choice: usize,
    #[serde(default)]
    pub short_description: usize,
    #[serde(default)]
    pub long_description: usize,
    #[serde(default)]
    pub case_study: usize,
}

impl QuestionRequest {
    pub fn count(&self, kind: QuestionKind) -> usize {
        match kind {
            QuestionKind::MultipleChoice => self.multiple_choice,
            QuestionKind::ShortDescription => self.short_description,
            QuestionKind::LongDescription => self.long_description,
            QuestionKind::CaseStudy => self.case_study,
        }
    }

    pub fn total(&self) -> usize {
        self.multiple_choice + self.short_description + self.long_description + self.case_study
    }
}

/// External question generator.
pub trait QuestionFactory: Send + Sync {
    fn generate(&self, text: &str, request: &QuestionRequest) -> Result<Vec<QuestionRecord>>;
}

/// Wrong answer choices for a multiple-choice keyword, drawn from its synonyms.
#[derive(Clone)]
pub struct DistractorGenerator {
    expander: SynonymExpander,
    filter: LemmaFilter,
    limit: usize,
}

impl DistractorGenerator {
    pub fn new(expander: SynonymExpander, limit: usize) -> Self {
        Self {
            expander,
            filter: LemmaFilter::distractors(),
            limit,
        }
    }

    pub fn with_filter(mut self, filter: LemmaFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Up to `limit` single-word synonyms of `word` other than `word`, in lexicon order.
    pub fn distractors_for(&self, word: &str) -> Vec<String> {
        let distractors: Vec<String> = self
            .expander
            .synonyms_for(word, &self.filter)
            .iter()
            .take(self.limit)
            .map(str::to_string)
            .collect();
        debug!(target: TARGET_SCORING, "Distractors for '{}': {:?}", word, distractors);
        distractors
    }
}
