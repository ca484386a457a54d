//! Base-form resolution for inflected words.
//!
//! Irregular forms are resolved through the exception lists (`noun.exc`,
//! `verb.exc`, ...); regular forms through suffix detachment rules. Only
//! candidates present in the index for that part of speech are kept.

use std::collections::HashMap;

use super::PartOfSpeech;

const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

const VERB_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

const ADJ_RULES: &[(&str, &str)] = &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")];

fn detachment_rules(pos: PartOfSpeech) -> &'static [(&'static str, &'static str)] {
    match pos {
        PartOfSpeech::Noun => NOUN_RULES,
        PartOfSpeech::Verb => VERB_RULES,
        PartOfSpeech::Adjective => ADJ_RULES,
        PartOfSpeech::Adverb => &[],
    }
}

/// Exception list for one part of speech: inflected form -> base forms.
pub type ExceptionMap = HashMap<String, Vec<String>>;

/// Parse an exception file: each line is an inflected form followed by one or
/// more base forms.
pub fn parse_exceptions(contents: &str) -> ExceptionMap {
    let mut map = ExceptionMap::new();
    for line in contents.lines() {
        let mut fields = line.split_whitespace();
        if let Some(inflected) = fields.next() {
            let bases: Vec<String> = fields.map(str::to_string).collect();
            if !bases.is_empty() {
                map.entry(inflected.to_string()).or_default().extend(bases);
            }
        }
    }
    map
}

/// Candidate base forms of `form` for `pos`, the form itself first, filtered
/// to those `is_known` accepts and deduplicated.
pub fn base_forms<F>(
    form: &str,
    pos: PartOfSpeech,
    exceptions: Option<&ExceptionMap>,
    is_known: F,
) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut candidates = vec![form.to_string()];

    match exceptions.and_then(|map| map.get(form)) {
        Some(bases) => candidates.extend(bases.iter().cloned()),
        None => {
            for (suffix, replacement) in detachment_rules(pos) {
                if let Some(stem) = form.strip_suffix(suffix) {
                    candidates.push(format!("{}{}", stem, replacement));
                }
            }
        }
    }

    let mut result: Vec<String> = Vec::new();
    for candidate in candidates {
        if !candidate.is_empty() && is_known(&candidate) && !result.contains(&candidate) {
            result.push(candidate);
        }
    }
    result
}
