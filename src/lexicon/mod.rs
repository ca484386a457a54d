//! Lexical knowledge base used for synonym expansion.
//!
//! A [`Lexicon`] answers one question: which sense-groups (synsets) contain a
//! word, and what are the surface forms (lemmas) of each. The production
//! implementation reads the WordNet database files; [`MemoryLexicon`] holds a
//! small table and is used by tests and tiny deployments.

pub mod memory;
pub mod morphy;
pub mod wordnet;

pub use memory::MemoryLexicon;
pub use wordnet::WordNetLexicon;

use serde::Serialize;
use std::fmt;

/// WordNet part of speech. Adjective satellites are folded into `Adjective`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 4] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
    ];

    /// Suffix of the WordNet database files for this part of speech.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adj",
            PartOfSpeech::Adverb => "adv",
        }
    }

    /// Parse the single-letter synset type used in WordNet data files.
    pub fn from_synset_type(code: &str) -> Option<Self> {
        match code {
            "n" => Some(PartOfSpeech::Noun),
            "v" => Some(PartOfSpeech::Verb),
            "a" | "s" => Some(PartOfSpeech::Adjective),
            "r" => Some(PartOfSpeech::Adverb),
            _ => None,
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_suffix())
    }
}

/// A sense-group of interchangeable word senses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Synset {
    pub pos: PartOfSpeech,
    pub lemmas: Vec<String>,
}

/// Lexical knowledge base collaborator. Implementations are loaded once and
/// shared read-only across requests.
pub trait Lexicon: Send + Sync {
    fn synsets_for(&self, word: &str) -> Vec<Synset>;
}

/// Lookup key form of a word: lowercase, spaces joined by underscores.
pub fn lookup_form(word: &str) -> String {
    word.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
