//! Reader for the WordNet 3.x database files.
//!
//! The whole database is parsed into memory at startup: `index.<pos>` maps a
//! lemma to synset offsets, `data.<pos>` maps an offset to the synset's
//! lemmas, `<pos>.exc` lists irregular inflections.

use anyhow::{anyhow, Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::morphy::{base_forms, parse_exceptions, ExceptionMap};
use super::{lookup_form, Lexicon, PartOfSpeech, Synset};
use crate::TARGET_LEXICON;

/// Raw file contents for one part of speech.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosSources<'a> {
    pub index: &'a str,
    pub data: &'a str,
    pub exceptions: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct WordNetLexicon {
    index: HashMap<PartOfSpeech, HashMap<String, Vec<u64>>>,
    synsets: HashMap<PartOfSpeech, HashMap<u64, Vec<String>>>,
    exceptions: HashMap<PartOfSpeech, ExceptionMap>,
}

impl WordNetLexicon {
    /// Load every part of speech from a WordNet `dict` directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let start = Instant::now();
        info!(target: TARGET_LEXICON, "Loading WordNet database from {}", dir.display());

        let mut lexicon = WordNetLexicon::default();
        for pos in PartOfSpeech::ALL {
            let suffix = pos.file_suffix();
            let index_path = dir.join(format!("index.{}", suffix));
            let data_path = dir.join(format!("data.{}", suffix));
            let exc_path = dir.join(format!("{}.exc", suffix));

            let index = std::fs::read_to_string(&index_path)
                .with_context(|| format!("Failed to read {}", index_path.display()))?;
            let data = std::fs::read_to_string(&data_path)
                .with_context(|| format!("Failed to read {}", data_path.display()))?;
            let exceptions = match std::fs::read_to_string(&exc_path) {
                Ok(contents) => Some(contents),
                Err(e) => {
                    warn!(target: TARGET_LEXICON, "No exception list at {}: {}", exc_path.display(), e);
                    None
                }
            };

            lexicon.add_part_of_speech(
                pos,
                PosSources {
                    index: &index,
                    data: &data,
                    exceptions: exceptions.as_deref(),
                },
            )?;
        }

        info!(
            target: TARGET_LEXICON,
            "Loaded WordNet: {} lemmas, {} synsets in {:?}",
            lexicon.lemma_count(),
            lexicon.synset_count(),
            start.elapsed()
        );
        Ok(lexicon)
    }

    /// Build a lexicon from in-memory file contents.
    pub fn from_sources(sources: &[(PartOfSpeech, PosSources<'_>)]) -> Result<Self> {
        let mut lexicon = WordNetLexicon::default();
        for (pos, pos_sources) in sources {
            lexicon.add_part_of_speech(*pos, *pos_sources)?;
        }
        Ok(lexicon)
    }

    fn add_part_of_speech(&mut self, pos: PartOfSpeech, sources: PosSources<'_>) -> Result<()> {
        let index = self.index.entry(pos).or_default();
        for (line_no, line) in data_lines(sources.index) {
            let (lemma, offsets) = parse_index_line(line)
                .ok_or_else(|| anyhow!("Malformed index.{} line {}", pos, line_no + 1))?;
            index.insert(lemma, offsets);
        }

        let synsets = self.synsets.entry(pos).or_default();
        for (line_no, line) in data_lines(sources.data) {
            let (offset, lemmas) = parse_data_line(line)
                .ok_or_else(|| anyhow!("Malformed data.{} line {}", pos, line_no + 1))?;
            synsets.insert(offset, lemmas);
        }

        if let Some(exceptions) = sources.exceptions {
            self.exceptions.insert(pos, parse_exceptions(exceptions));
        }
        Ok(())
    }

    pub fn lemma_count(&self) -> usize {
        self.index.values().map(HashMap::len).sum()
    }

    pub fn synset_count(&self) -> usize {
        self.synsets.values().map(HashMap::len).sum()
    }
}

impl Lexicon for WordNetLexicon {
    fn synsets_for(&self, word: &str) -> Vec<Synset> {
        let form = lookup_form(word);
        if form.is_empty() {
            return Vec::new();
        }

        let mut seen: HashSet<(PartOfSpeech, u64)> = HashSet::new();
        let mut result = Vec::new();

        for pos in PartOfSpeech::ALL {
            let (Some(index), Some(synsets)) = (self.index.get(&pos), self.synsets.get(&pos))
            else {
                continue;
            };

            let forms = base_forms(&form, pos, self.exceptions.get(&pos), |candidate| {
                index.contains_key(candidate)
            });

            for base in forms {
                for offset in index.get(&base).into_iter().flatten() {
                    if !seen.insert((pos, *offset)) {
                        continue;
                    }
                    match synsets.get(offset) {
                        Some(lemmas) => result.push(Synset {
                            pos,
                            lemmas: lemmas.clone(),
                        }),
                        None => {
                            debug!(target: TARGET_LEXICON, "Index points at missing {} synset {:08}", pos, offset)
                        }
                    }
                }
            }
        }

        result
    }
}

/// Non-empty lines that are not part of the license header (which is indented).
fn data_lines(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.starts_with(' ') && !line.trim().is_empty())
}

/// `lemma pos synset_cnt p_cnt [ptr_symbol...] sense_cnt tagsense_cnt offset...`
fn parse_index_line(line: &str) -> Option<(String, Vec<u64>)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let lemma = fields.first()?.to_string();
    let synset_cnt: usize = fields.get(2)?.parse().ok()?;
    if fields.len() < 4 + synset_cnt {
        return None;
    }
    let offsets = fields[fields.len() - synset_cnt..]
        .iter()
        .map(|field| field.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    Some((lemma, offsets))
}

/// `offset lex_filenum ss_type w_cnt word lex_id [word lex_id...] ... | gloss`
fn parse_data_line(line: &str) -> Option<(u64, Vec<String>)> {
    let body = line.split(" | ").next()?;
    let fields: Vec<&str> = body.split_whitespace().collect();
    let offset: u64 = fields.first()?.parse().ok()?;
    PartOfSpeech::from_synset_type(fields.get(2)?)?;
    let word_count = usize::from_str_radix(fields.get(3)?, 16).ok()?;

    let mut lemmas = Vec::with_capacity(word_count);
    for i in 0..word_count {
        let word = fields.get(4 + i * 2)?;
        lemmas.push(strip_syntactic_marker(word).to_string());
    }
    Some((offset, lemmas))
}

/// Adjective lemmas may carry a position marker such as `(a)`, `(p)` or `(ip)`.
fn strip_syntactic_marker(word: &str) -> &str {
    match word.find('(') {
        Some(pos) if word.ends_with(')') && pos > 0 => &word[..pos],
        _ => word,
    }
}
