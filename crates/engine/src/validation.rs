//! Cross-reference consistency checks over the fully parsed lexicon.
//!
//! ## Definition comparison
//!
//! A derived entry's definition is compared to its root's after collapsing
//! whitespace runs and trimming. Anything else (case, punctuation) must match
//! exactly.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::ExceptionConfig;
use crate::error::Diagnostic;
use crate::model::{NodeKey, PartOfSpeech, Sense, Tense, WordRecord};

#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Every problem found, fatal or not. Callers decide what is fatal.
    pub diagnostics: Vec<Diagnostic>,
    /// Root nodes of words with more than one sense per part of speech.
    pub reserved: BTreeSet<NodeKey>,
}

/// Whitespace-insensitive text equality.
pub fn same_text(a: &str, b: &str) -> bool {
    a.split_whitespace().eq(b.split_whitespace())
}

// ---------------------------------------------------------------------------
// Abbreviation
// ---------------------------------------------------------------------------

const REGULAR_SUFFIXES: [[&str; 3]; 2] = [["ED", "ING", "S"], ["ED", "ES", "ING"]];

/// Rewrite `[v WALKS, WALKED, WALKING]` as `[v -S, -ED, -ING]`.
///
/// Applies only to exactly three tenses of one form each, whose forms are the
/// word plus the regular suffixes (in any order).
pub fn abbreviate_regular(word: &str, tenses: &mut [Tense]) -> bool {
    if tenses.len() != 3 || tenses.iter().any(|t| t.len() != 1) {
        return false;
    }

    let mut suffixes: Vec<String> = Vec::with_capacity(3);
    for tense in tenses.iter() {
        match tense[0].surface.strip_prefix(word) {
            Some(suffix) if !suffix.is_empty() => suffixes.push(suffix.to_string()),
            _ => return false,
        }
    }

    let mut sorted: Vec<&str> = suffixes.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    if !REGULAR_SUFFIXES.iter().any(|set| sorted == set) {
        return false;
    }

    for (tense, suffix) in tenses.iter_mut().zip(&suffixes) {
        tense[0].surface = format!("-{suffix}");
    }
    true
}

pub fn normalize_abbreviations(words: &mut [WordRecord]) -> usize {
    let mut rewritten = 0;
    for record in words.iter_mut() {
        let word = &record.word;
        for entry in record.entries.iter_mut() {
            if let Sense::Root { tenses } = &mut entry.sense {
                if abbreviate_regular(word, tenses) {
                    rewritten += 1;
                }
            }
        }
    }
    rewritten
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check root references, conjugation completeness, and duplicate senses.
///
/// Missing conjugations are recorded on the root word's tags as well as
/// returned as consistency diagnostics.
pub fn validate(
    words: &mut [WordRecord],
    known: &FxHashSet<String>,
    exceptions: &ExceptionConfig,
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    // Root senses by (root, pos) -> (word index, entry index)
    let mut root_senses: FxHashMap<NodeKey, Vec<(usize, usize)>> = FxHashMap::default();
    let mut sense_counts: FxHashMap<(&str, PartOfSpeech), usize> = FxHashMap::default();
    for (wi, record) in words.iter().enumerate() {
        for (ei, entry) in record.entries.iter().enumerate() {
            if entry.is_root_sense() {
                root_senses
                    .entry(NodeKey::new(record.word.as_str(), entry.pos))
                    .or_default()
                    .push((wi, ei));
            }
            *sense_counts.entry((record.word.as_str(), entry.pos)).or_default() += 1;
        }
    }

    let mut missing: Vec<(usize, String)> = Vec::new();

    for record in words.iter() {
        for entry in &record.entries {
            let key = entry.node_key(&record.word);
            if sense_counts[&(record.word.as_str(), entry.pos)] > 1 {
                outcome.reserved.insert(key.clone());
            }

            let Sense::Derived { root, .. } = &entry.sense else {
                continue;
            };
            if exceptions.is_exempt(&record.word) {
                continue;
            }

            if !known.contains(root) {
                outcome.diagnostics.push(Diagnostic::reference(
                    &record.word,
                    None,
                    format!("root word '{root}' is not a known word"),
                ));
                continue;
            }

            let Some(candidates) = root_senses.get(&key) else {
                outcome.diagnostics.push(Diagnostic::reference(
                    &record.word,
                    None,
                    format!("root word definition not found: {key}"),
                ));
                continue;
            };

            let matched = candidates.iter().copied().find(|&(wi, ei)| {
                same_text(&words[wi].entries[ei].definition, &entry.definition)
            });
            let Some((wi, ei)) = matched else {
                outcome.diagnostics.push(Diagnostic::reference(
                    &record.word,
                    None,
                    format!("definition does not match root definition of {key}"),
                ));
                continue;
            };

            if !words[wi].entries[ei].expanded_conjugations(root).contains(&record.word) {
                outcome.diagnostics.push(Diagnostic::consistency(
                    root,
                    format!("{root} has missing conjugation(s): {}", record.word),
                ));
                missing.push((wi, record.word.clone()));
            }
        }
    }

    for (wi, word) in missing {
        words[wi].tags.add_missing_conjugation(&word);
    }

    if !outcome.reserved.is_empty() {
        log::debug!("{} root node(s) reserved for manual disambiguation", outcome.reserved.len());
    }

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
