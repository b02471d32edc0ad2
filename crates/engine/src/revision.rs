//! Root-status comparison against a prior published revision.
//!
//! Only the last segment of each prior word is read: whether it names a root
//! word, and its part of speech.

use rustc_hash::FxHashMap;

use crate::error::Diagnostic;
use crate::loader::SEGMENT_SEPARATOR;
use crate::model::{PartOfSpeech, WordRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorStatus {
    pub is_root: bool,
    pub pos: PartOfSpeech,
}

#[derive(Debug, Clone, Default)]
pub struct PriorRevision {
    words: FxHashMap<String, PriorStatus>,
}

impl PriorRevision {
    /// Parse a prior revision. Every bad line or segment is reported.
    pub fn parse(input: &str) -> Result<Self, Vec<Diagnostic>> {
        let mut words = FxHashMap::default();
        let mut errors = Vec::new();

        for (idx, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let [word, definition] = fields[..] else {
                errors.push(Diagnostic::structural(
                    &format!("prior line {}", idx + 1),
                    Some(line),
                    "prior revision line does not have exactly one tab",
                ));
                continue;
            };
            let word = word.trim().to_uppercase();

            for segment in definition.trim().split(SEGMENT_SEPARATOR) {
                match segment_status(segment) {
                    Ok(status) => {
                        words.insert(word.clone(), status);
                    }
                    Err(msg) => errors.push(Diagnostic::structural(&word, Some(segment), msg)),
                }
            }
        }

        if errors.is_empty() {
            Ok(Self { words })
        } else {
            Err(errors)
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn status(&self, word: &str) -> Option<PriorStatus> {
        self.words.get(word).copied()
    }

    /// Tag words whose root status flipped for the same part of speech.
    pub fn check(&self, words: &mut [WordRecord]) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();
        for record in words.iter_mut() {
            let Some(prior) = self.status(&record.word) else {
                continue;
            };
            let flipped = record
                .entries
                .iter()
                .any(|e| e.pos == prior.pos && e.is_root_sense() != prior.is_root);
            if flipped {
                record.tags.root_status_changed = true;
                warnings.push(Diagnostic::consistency(
                    &record.word,
                    format!(
                        "root status changed since prior revision (was {} [{}])",
                        if prior.is_root { "root" } else { "non-root" },
                        prior.pos
                    ),
                ));
            }
        }
        warnings
    }
}

fn segment_status(segment: &str) -> Result<PriorStatus, String> {
    let segment = segment.trim();
    let lead = segment
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(segment.len());
    let is_root = !(lead > 0 && segment[lead..].starts_with(','));

    // Exactly one `[word` tag
    let mut tags = segment.match_indices('[').filter_map(|(i, _)| {
        let rest = &segment[i + 1..];
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    });
    let tag = match (tags.next(), tags.next()) {
        (Some(tag), None) => tag,
        _ => return Err("prior definition does not have exactly one part of speech".into()),
    };
    let pos = PartOfSpeech::from_tag(tag)
        .ok_or_else(|| format!("prior definition has invalid part of speech '{tag}'"))?;

    Ok(PriorStatus { is_root, pos })
}
