use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::{lookup_form, Lexicon, PartOfSpeech, Synset};
use crate::TARGET_LEXICON;

/// Lexicon held entirely in memory, keyed by lookup form.
///
/// The JSON form maps a word to its sense-groups:
/// `{ "cell": [["cell", "cadre"], ["cell", "electric_cell"]] }`.
/// Entries carry no part of speech and are reported as nouns.
#[derive(Debug, Clone, Default)]
pub struct MemoryLexicon {
    entries: HashMap<String, Vec<Vec<String>>>,
}

impl MemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synset<I, S>(mut self, word: &str, lemmas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .entry(lookup_form(word))
            .or_default()
            .push(lemmas.into_iter().map(Into::into).collect());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<Vec<String>>> =
            serde_json::from_str(json).context("Failed to parse lexicon JSON")?;
        let entries = raw
            .into_iter()
            .map(|(word, synsets)| (lookup_form(&word), synsets))
            .collect();
        Ok(Self { entries })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file {}", path.display()))?;
        let lexicon = Self::from_json(&json)?;
        info!(target: TARGET_LEXICON, "Loaded {} lexicon entries from {}", lexicon.entries.len(), path.display());
        Ok(lexicon)
    }
}

impl Lexicon for MemoryLexicon {
    fn synsets_for(&self, word: &str) -> Vec<Synset> {
        self.entries
            .get(&lookup_form(word))
            .map(|synsets| {
                synsets
                    .iter()
                    .map(|lemmas| Synset {
                        pos: PartOfSpeech::Noun,
                        lemmas: lemmas.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_lexicon_lookup_is_case_insensitive() {
        let lexicon = MemoryLexicon::new().with_synset("Energy", ["energy", "free_energy"]);
        let synsets = lexicon.synsets_for("ENERGY");
        assert_eq!(synsets.len(), 1);
        assert_eq!(synsets[0].lemmas, vec!["energy", "free_energy"]);
        assert!(lexicon.synsets_for("cell").is_empty());
    }

    #[test]
    fn test_memory_lexicon_from_json() {
        let lexicon =
            MemoryLexicon::from_json(r#"{"Cell": [["cell"], ["cell", "cadre"]]}"#).unwrap();
        assert_eq!(lexicon.synsets_for("cell").len(), 2);
        assert!(MemoryLexicon::from_json("[1, 2]").is_err());
    }
}
