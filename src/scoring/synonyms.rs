use std::sync::Arc;
use tracing::debug;

use super::types::{SynonymSet, TokenSet};
use crate::lexicon::Lexicon;
use crate::TARGET_SCORING;

/// Predicate deciding which lemmas of a synset are kept during expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LemmaFilter {
    /// Keep underscore-joined multi-word lemmas such as `power_station`.
    pub keep_multiword: bool,
    /// Drop lemmas equal to the looked-up word, ignoring case.
    pub exclude_source: bool,
}

impl LemmaFilter {
    /// Recall-oriented policy used for answer scoring: every lemma is kept.
    pub const fn scoring() -> Self {
        Self {
            keep_multiword: true,
            exclude_source: false,
        }
    }

    /// Policy for multiple-choice distractors: single words other than the source.
    pub const fn distractors() -> Self {
        Self {
            keep_multiword: false,
            exclude_source: true,
        }
    }

    pub fn with_multiword(mut self, keep: bool) -> Self {
        self.keep_multiword = keep;
        self
    }

    pub fn with_source_excluded(mut self, exclude: bool) -> Self {
        self.exclude_source = exclude;
        self
    }

    pub fn accepts(&self, source: &str, lemma: &str) -> bool {
        if !self.keep_multiword && lemma.contains('_') {
            return false;
        }
        if self.exclude_source && lemma.to_lowercase() == source.to_lowercase() {
            return false;
        }
        true
    }
}

impl Default for LemmaFilter {
    fn default() -> Self {
        Self::scoring()
    }
}

/// Expands words into the surface forms of every sense they belong to.
/// No sense disambiguation takes place.
#[derive(Clone)]
pub struct SynonymExpander {
    lexicon: Arc<dyn Lexicon>,
}

impl SynonymExpander {
    pub fn new(lexicon: Arc<dyn Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Lemmas of every synset containing `word`, in lexicon order.
    pub fn synonyms_for(&self, word: &str, filter: &LemmaFilter) -> SynonymSet {
        let mut synonyms = SynonymSet::new();
        for synset in self.lexicon.synsets_for(word) {
            for lemma in &synset.lemmas {
                if filter.accepts(word, lemma) {
                    synonyms.insert(lemma);
                }
            }
        }
        synonyms
    }

    /// Union of the synonyms of every token. Tokens without senses contribute nothing.
    pub fn expand_synonyms(&self, tokens: &TokenSet, filter: &LemmaFilter) -> SynonymSet {
        let mut synonyms = SynonymSet::new();
        for token in tokens.iter() {
            synonyms.union_with(&self.synonyms_for(token, filter));
        }

        debug!(
            target: TARGET_SCORING,
            "Expanded {} tokens into {} synonyms", tokens.len(), synonyms.len()
        );
        synonyms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::MemoryLexicon;

    fn expander() -> SynonymExpander {
        let lexicon = MemoryLexicon::new()
            .with_synset("energy", ["energy", "free_energy"])
            .with_synset("energy", ["vim", "energy", "vitality"])
            .with_synset("cell", ["cell", "Cell", "cadre"]);
        SynonymExpander::new(Arc::new(lexicon))
    }

    #[test]
    fn test_scoring_filter_keeps_every_lemma() {
        let synonyms = expander().synonyms_for("energy", &LemmaFilter::scoring());
        assert_eq!(
            synonyms.iter().collect::<Vec<_>>(),
            vec!["energy", "free_energy", "vim", "vitality"]
        );
    }

    #[test]
    fn test_distractor_filter_drops_multiword_and_source() {
        let synonyms = expander().synonyms_for("energy", &LemmaFilter::distractors());
        assert_eq!(synonyms.iter().collect::<Vec<_>>(), vec!["vim", "vitality"]);

        let synonyms = expander().synonyms_for("cell", &LemmaFilter::distractors());
        assert_eq!(synonyms.iter().collect::<Vec<_>>(), vec!["cadre"]);
    }

    #[test]
    fn test_expand_synonyms_unions_tokens() {
        let tokens: TokenSet = ["cell", "unknownword", "energy"].into_iter().collect();
        let synonyms = expander().expand_synonyms(&tokens, &LemmaFilter::scoring());
        assert!(synonyms.contains("cadre"));
        assert!(synonyms.contains("Cell"));
        assert!(synonyms.contains("vim"));
        assert_eq!(synonyms.len(), 7);
    }

    #[test]
    fn test_filter_builders() {
        let filter = LemmaFilter::scoring().with_multiword(false);
        assert!(!filter.accepts("cell", "cell_phone"));
        let filter = LemmaFilter::distractors().with_source_excluded(false);
        assert!(filter.accepts("cell", "Cell"));
    }
}
