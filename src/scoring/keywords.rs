use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::stopwords::is_stop_word;
use super::types::TokenSet;
use crate::TARGET_SCORING;

/// One token as classified by a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub is_stopword: bool,
    pub is_punct: bool,
}

/// Linguistic tokenizer with stopword and punctuation classification.
pub trait KeywordTokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Suffixes split off a word the way English tokenizers treat possessives
/// and contractions. Matched case-insensitively, with `'` or `\u{2019}`.
const CLITICS: [&str; 7] = ["n't", "'s", "'d", "'ll", "'m", "'re", "'ve"];

/// Split `word` into its stem and a trailing clitic, if it has one.
fn split_clitic(word: &str) -> (&str, Option<&str>) {
    let normalized = word.to_lowercase().replace('\u{2019}', "'");
    for clitic in CLITICS {
        if !normalized.ends_with(clitic) {
            continue;
        }
        // Clitic letters are ASCII, so char counts line up with `normalized`
        let clitic_chars = clitic.chars().count();
        let Some((split, _)) = word.char_indices().rev().nth(clitic_chars - 1) else {
            continue;
        };
        if split == 0 {
            return (word, None);
        }
        return (&word[..split], Some(&word[split..]));
    }
    (word, None)
}

/// Unicode word-boundary tokenizer backed by the English stopword list.
/// Possessive and contraction suffixes become tokens of their own.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedTokenizer {
    // Lowercased
    extra_stopwords: HashSet<String>,
}

impl RuleBasedTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra_stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    fn is_stopword(&self, surface: &str) -> bool {
        is_stop_word(surface) || self.extra_stopwords.contains(&surface.to_lowercase())
    }

    fn token(&self, surface: &str) -> Token {
        Token {
            surface: surface.to_string(),
            is_stopword: self.is_stopword(surface),
            is_punct: !surface.chars().any(char::is_alphanumeric),
        }
    }
}

impl KeywordTokenizer for RuleBasedTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        for segment in text.split_word_bounds() {
            if segment.trim().is_empty() {
                continue;
            }
            match split_clitic(segment) {
                (stem, Some(clitic)) => {
                    tokens.push(self.token(stem));
                    tokens.push(self.token(clitic));
                }
                (word, None) => tokens.push(self.token(word)),
            }
        }
        tokens
    }
}

/// Reduces a passage to its content-bearing tokens.
#[derive(Clone)]
pub struct KeywordExtractor {
    tokenizer: Arc<dyn KeywordTokenizer>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(Arc::new(RuleBasedTokenizer::new()))
    }
}

impl KeywordExtractor {
    pub fn new(tokenizer: Arc<dyn KeywordTokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Drop stopwords and punctuation, keeping document order and original case.
    pub fn extract_keywords(&self, text: &str) -> TokenSet {
        let tokens: TokenSet = self
            .tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|token| !token.is_stopword && !token.is_punct)
            .map(|token| token.surface)
            .collect();

        debug!(target: TARGET_SCORING, "Extracted {} keywords: {:?}", tokens.len(), tokens);
        tokens
    }
}
