use std::fmt;

use serde::Serialize;

/// Category of a problem found while loading or validating a lexicon.
///
/// Structural and reference problems are always fatal. Consistency problems
/// only ever surface as tags. Misspellings depend on the active
/// [`MisspellingPolicy`](crate::config::MisspellingPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Malformed brackets, tabs, or casing.
    Structural,
    /// Unknown alt spelling, unmatched root definition, broken root reference.
    Reference,
    /// Missing conjugation or stale root status.
    Consistency,
    /// Lowercase token that is not a known word.
    Misspelling,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural => write!(f, "structural"),
            Self::Reference => write!(f, "reference"),
            Self::Consistency => write!(f, "consistency"),
            Self::Misspelling => write!(f, "misspelling"),
        }
    }
}

/// One problem, attributed to the word (and segment, when known) it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn structural(word: &str, segment: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Structural, word, segment, message)
    }

    pub fn reference(word: &str, segment: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Reference, word, segment, message)
    }

    pub fn consistency(word: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Consistency, word, None, message)
    }

    pub fn misspelling(word: &str, segment: &str, tokens: &[String]) -> Self {
        Self::new(
            DiagnosticKind::Misspelling,
            word,
            Some(segment),
            format!("definition has misspelled word(s): {}", tokens.join(", ")),
        )
    }

    fn new(kind: DiagnosticKind, word: &str, segment: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            word: word.to_string(),
            segment: segment.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.segment {
            Some(segment) => write!(f, "{} [{}]: {} ({segment})", self.word, self.kind, self.message),
            None => write!(f, "{} [{}]: {}", self.word, self.kind, self.message),
        }
    }
}

#[derive(Debug)]
pub enum LexiconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Policy validation error (bad weight, lowercase exception word, etc.).
    ConfigValidation(String),
    /// The lexicon has fatal diagnostics. Nothing should be written.
    Invalid(Vec<Diagnostic>),
    /// The consolidation stage found a state validation should have ruled out.
    Internal(String),
}

impl LexiconError {
    /// Fatal diagnostics carried by an `Invalid` error, empty otherwise.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Invalid(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

impl fmt::Display for LexiconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Invalid(diagnostics) => {
                write!(f, "lexicon has {} error(s)", diagnostics.len())?;
                for d in diagnostics {
                    write!(f, "\n  {d}")?;
                }
                Ok(())
            }
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for LexiconError {}
