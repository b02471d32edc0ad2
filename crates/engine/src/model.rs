use rustc_hash::FxHashSet;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Part of speech
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Interjection,
    Pronoun,
    Preposition,
    Conjunction,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 8] = [
        Self::Noun,
        Self::Verb,
        Self::Adjective,
        Self::Adverb,
        Self::Interjection,
        Self::Pronoun,
        Self::Preposition,
        Self::Conjunction,
    ];

    /// The bracket tag used in definitions (`n`, `v`, `adj`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Noun => "n",
            Self::Verb => "v",
            Self::Adjective => "adj",
            Self::Adverb => "adv",
            Self::Interjection => "interj",
            Self::Pronoun => "pron",
            Self::Preposition => "prep",
            Self::Conjunction => "conj",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.tag() == tag)
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// ---------------------------------------------------------------------------
// Conjugations
// ---------------------------------------------------------------------------

/// Placeholder standing in for the root word inside a conjugation form.
pub const SHORTHAND: char = '-';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConjugationForm {
    pub surface: String,
    pub origin: Option<String>,
}

impl ConjugationForm {
    pub fn new(surface: impl Into<String>) -> Self {
        Self { surface: surface.into(), origin: None }
    }

    /// The literal word this form denotes for the given root.
    pub fn expand(&self, root: &str) -> String {
        self.surface.replace(SHORTHAND, root)
    }
}

/// Alternative surface forms for one tense.
pub type Tense = Vec<ConjugationForm>;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Whether an entry is the authoritative sense of its root or derives from one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sense {
    /// The owning word is its own root. Only root senses carry conjugations.
    Root { tenses: Vec<Tense> },
    /// The owning word derives from `root`, possibly through `intermediate`.
    Derived { root: String, intermediate: Option<String> },
}

/// One parsed definition segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub sense: Sense,
    pub origin: Option<String>,
    pub definition: String,
    pub pos: PartOfSpeech,
    pub alts: Vec<String>,
}

impl Entry {
    pub fn is_root_sense(&self) -> bool {
        matches!(self.sense, Sense::Root { .. })
    }

    /// Root word of this entry, given the word that owns it.
    pub fn root_word<'a>(&'a self, word: &'a str) -> &'a str {
        match &self.sense {
            Sense::Root { .. } => word,
            Sense::Derived { root, .. } => root,
        }
    }

    pub fn tenses(&self) -> &[Tense] {
        match &self.sense {
            Sense::Root { tenses } => tenses,
            Sense::Derived { .. } => &[],
        }
    }

    /// Every conjugated word this root sense licenses, shorthand expanded.
    pub fn expanded_conjugations(&self, word: &str) -> FxHashSet<String> {
        self.tenses()
            .iter()
            .flatten()
            .map(|form| form.expand(word))
            .collect()
    }

    pub fn node_key(&self, word: &str) -> NodeKey {
        NodeKey::new(self.root_word(word), self.pos)
    }
}

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

/// Derived per-word flags that surface as tags in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordTags {
    pub root_status_changed: bool,
    pub missing_conjugations: Vec<String>,
    pub misspellings: Vec<String>,
}

impl WordTags {
    pub fn add_missing_conjugation(&mut self, word: &str) {
        if !self.missing_conjugations.iter().any(|w| w == word) {
            self.missing_conjugations.push(word.to_string());
        }
    }

    pub fn add_misspellings(&mut self, tokens: &[String]) {
        for token in tokens {
            if !self.misspellings.contains(token) {
                self.misspellings.push(token.clone());
            }
        }
    }
}

/// A word with its authored text and parsed entries, in authored order.
#[derive(Debug, Clone)]
pub struct WordRecord {
    pub word: String,
    pub original: String,
    pub entries: Vec<Entry>,
    pub tags: WordTags,
}

// ---------------------------------------------------------------------------
// Graph keys
// ---------------------------------------------------------------------------

/// Alt-spelling graph node identity: (root word, part of speech).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub root: String,
    pub pos: PartOfSpeech,
}

impl NodeKey {
    pub fn new(root: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self { root: root.into(), pos }
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.root, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_tags_round_trip() {
        for pos in PartOfSpeech::ALL {
            assert_eq!(PartOfSpeech::from_tag(pos.tag()), Some(pos));
        }
        assert_eq!(PartOfSpeech::from_tag("noun"), None);
        assert_eq!(PartOfSpeech::from_tag("N"), None);
    }

    #[test]
    fn shorthand_expands_to_root() {
        assert_eq!(ConjugationForm::new("-ED").expand("WALK"), "WALKED");
        assert_eq!(ConjugationForm::new("RAN").expand("RUN"), "RAN");
    }

    #[test]
    fn derived_entry_has_no_conjugations() {
        let entry = Entry {
            sense: Sense::Derived { root: "END".into(), intermediate: None },
            origin: None,
            definition: "to finish".into(),
            pos: PartOfSpeech::Verb,
            alts: vec![],
        };
        assert!(entry.tenses().is_empty());
        assert_eq!(entry.root_word("ENDS"), "END");
        assert_eq!(entry.node_key("ENDS"), NodeKey::new("END", PartOfSpeech::Verb));
    }

    #[test]
    fn node_keys_order_by_root_then_pos() {
        let mut keys = vec![
            NodeKey::new("B", PartOfSpeech::Noun),
            NodeKey::new("A", PartOfSpeech::Verb),
            NodeKey::new("A", PartOfSpeech::Noun),
        ];
        keys.sort();
        assert_eq!(keys[0], NodeKey::new("A", PartOfSpeech::Noun));
        assert_eq!(keys[1], NodeKey::new("A", PartOfSpeech::Verb));
        assert_eq!(keys[2], NodeKey::new("B", PartOfSpeech::Noun));
    }
}
