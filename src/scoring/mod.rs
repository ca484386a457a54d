//! Answer scoring pipeline.
//!
//! A student answer is compared with an expert answer on three signals:
//! keywords of the student answer found among the synonyms of the expert
//! keywords, TF-IDF intent similarity, and the confidence of an extractive QA
//! model asked the expert answer as a question over the student answer. The signals are
//! combined by [`aggregate::calculate_score`].

pub mod aggregate;
pub mod completion;
pub mod error;
pub mod evaluator;
pub mod intent;
pub mod keywords;
pub mod matching;
pub mod stopwords;
pub mod synonyms;
pub mod types;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate, calculate_score, WEIGHT_COMPLETION, WEIGHT_INTENT, WEIGHT_KEYWORDS};
pub use completion::{default_inference_slots, CompletionOutcome, CompletionScorer};
pub use error::{AnswerSide, Degradation, ScoringError};
pub use evaluator::AnswerEvaluator;
pub use intent::{cosine_similarity, intent_score, TfidfMatrix, TfidfVectorizer};
pub use keywords::{KeywordExtractor, KeywordTokenizer, RuleBasedTokenizer, Token};
pub use matching::match_keywords;
pub use synonyms::{LemmaFilter, SynonymExpander};
pub use types::*;
