//! Definition grammar.
//!
//! One definition segment reads, in order:
//!
//! ```text
//! [INTERMEDIATE, ][ROOT, ][(origin) ]definition text[, also ALT, ALT] [pos TENSE, TENSE]
//! ```
//!
//! A tense is a list of alternative forms separated by whitespace (the word
//! `or` is ignored). A `(origin)` marker inside a tense applies to every
//! following form of that tense until the next marker.
//!
//! Parsing is a single left-to-right pass over a cursor. Each rule consumes
//! its prefix or leaves the cursor alone, so precedence is the rule order.

use rustc_hash::FxHashSet;

use crate::error::Diagnostic;
use crate::model::{ConjugationForm, Entry, PartOfSpeech, Sense, Tense};

/// Separator between definition text and alternate spellings.
pub const ALSO_MARKER: &str = ", also ";

const MISSPELLING_MIN_LEN: usize = 2;
const MISSPELLING_MAX_LEN: usize = 15;

/// Read-only inputs shared by every segment parse.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// Every word in the lexicon (first loading pass).
    pub known: &'a FxHashSet<String>,
    /// Lowercase function words never reported as misspellings.
    pub accepted: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSegment {
    pub entry: Entry,
    /// Upper-cased definition tokens that are not known words.
    pub misspellings: Vec<String>,
}

/// True for tokens with at least one uppercase letter and no lowercase ones.
pub fn is_upper_word(s: &str) -> bool {
    s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)
}

/// Parse one `/`-separated definition segment owned by `word`.
pub fn parse_segment(segment: &str, word: &str, ctx: ParseContext<'_>) -> Result<ParsedSegment, Diagnostic> {
    let structural = |msg: String| Diagnostic::structural(word, Some(segment), msg);
    let text = segment.trim();

    if text.matches('[').count() != 1 {
        return Err(structural("definition does not have exactly one '[' character".into()));
    }
    if text.matches(']').count() != 1 {
        return Err(structural("definition does not have exactly one ']' character".into()));
    }
    if !text.ends_with(']') {
        return Err(structural("definition does not end with ']' character".into()));
    }

    let mut cursor = Cursor::new(text);

    // Rules 1 + 2: `ROOT,` or `INTERMEDIATE, ROOT,`
    let first = cursor.take_reference();
    let second = first.and_then(|_| cursor.take_reference());
    let derived = match (first, second) {
        (None, _) => None,
        (Some(root), None) => Some((root, None)),
        (Some(intermediate), Some(root)) => Some((root, Some(intermediate))),
    };

    if let Some((root, intermediate)) = derived {
        if root == word || first == Some(word) {
            return Err(structural("definition lists word as its own root word".into()));
        }
        if let Some(intermediate) = intermediate {
            if intermediate == root {
                return Err(structural(format!(
                    "intermediate root '{intermediate}' repeats the root word"
                )));
            }
            if !ctx.known.contains(intermediate) {
                return Err(Diagnostic::reference(
                    word,
                    Some(segment),
                    format!("intermediate root '{intermediate}' is not a known word"),
                ));
            }
        }
    }

    // Rule 3: `(origin)`
    let origin = cursor.take_parenthetical();

    // Rule 4: `[pos tenses]`
    let (body, bracket) = cursor
        .split_bracket()
        .ok_or_else(|| structural("definition does not contain part of speech".into()))?;

    let bracket = bracket.trim();
    let (pos_tag, tense_text) = match bracket.split_once(char::is_whitespace) {
        Some((pos, rest)) => (pos, rest.trim()),
        None => (bracket, ""),
    };
    if pos_tag.is_empty() {
        return Err(structural("definition does not contain part of speech".into()));
    }
    let pos = PartOfSpeech::from_tag(pos_tag)
        .ok_or_else(|| structural(format!("definition contains invalid part of speech '{pos_tag}'")))?;

    let sense = match derived {
        Some((root, intermediate)) => {
            if !tense_text.is_empty() {
                return Err(structural("definition lists conjugations for non-root word".into()));
            }
            Sense::Derived {
                root: root.to_string(),
                intermediate: intermediate.map(str::to_string),
            }
        }
        None => {
            let tenses = if tense_text.is_empty() {
                Vec::new()
            } else {
                parse_tenses(tense_text).map_err(structural)?
            };
            Sense::Root { tenses }
        }
    };

    // Rule 5: `, also ALT, ALT`
    let (definition, alts) = match body.find(ALSO_MARKER) {
        Some(idx) => {
            let alts = parse_alts(&body[idx + ALSO_MARKER.len()..], word, segment, ctx)?;
            (body[..idx].trim(), alts)
        }
        None => (body, Vec::new()),
    };

    if definition.is_empty() {
        return Err(structural("definition text is empty".into()));
    }

    let misspellings = find_misspellings(definition, ctx);

    Ok(ParsedSegment {
        entry: Entry {
            sense,
            origin: origin.map(str::to_string),
            definition: definition.to_string(),
            pos,
            alts,
        },
        misspellings,
    })
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    /// Consume a leading `WORD,` where WORD is `[A-Z]+`.
    fn take_reference(&mut self) -> Option<&'a str> {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(self.rest.len());
        if end == 0 || !self.rest[end..].starts_with(',') {
            return None;
        }
        let word = &self.rest[..end];
        self.rest = self.rest[end + 1..].trim_start();
        Some(word)
    }

    /// Consume a leading non-empty `(...)`.
    fn take_parenthetical(&mut self) -> Option<&'a str> {
        let inner = self.rest.strip_prefix('(')?;
        let close = inner.find(')')?;
        if close == 0 {
            return None;
        }
        let tag = &inner[..close];
        self.rest = inner[close + 1..].trim_start();
        Some(tag)
    }

    /// Split the remainder into (text before `[`, text inside the brackets).
    /// The caller has already checked there is exactly one pair, closing the text.
    fn split_bracket(&self) -> Option<(&'a str, &'a str)> {
        let open = self.rest.find('[')?;
        let close = self.rest.rfind(']')?;
        if close < open {
            return None;
        }
        Some((self.rest[..open].trim(), &self.rest[open + 1..close]))
    }
}

// ---------------------------------------------------------------------------
// Tenses
// ---------------------------------------------------------------------------

enum TenseToken<'a> {
    Marker(&'a str),
    Form(&'a str),
}

fn tense_tokens(raw: &str) -> Result<Vec<TenseToken<'_>>, String> {
    let mut tokens = Vec::new();
    let mut rest = raw.trim_start();
    while !rest.is_empty() {
        if let Some(inner) = rest.strip_prefix('(') {
            let close = inner
                .find(')')
                .ok_or_else(|| format!("conjugation origin marker is not closed: '{raw}'"))?;
            let tag = inner[..close].trim();
            if tag.is_empty() {
                return Err(format!("empty conjugation origin marker: '{raw}'"));
            }
            tokens.push(TenseToken::Marker(tag));
            rest = inner[close + 1..].trim_start();
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '(')
                .unwrap_or(rest.len());
            let token = &rest[..end];
            if token != "or" {
                tokens.push(TenseToken::Form(token));
            }
            rest = rest[end..].trim_start();
        }
    }
    Ok(tokens)
}

fn parse_tenses(text: &str) -> Result<Vec<Tense>, String> {
    let mut tenses = Vec::new();
    for raw in text.split(',') {
        let mut tense: Tense = Vec::new();
        let mut origin: Option<&str> = None;
        let mut dangling = false;
        for token in tense_tokens(raw)? {
            match token {
                TenseToken::Marker(tag) => {
                    origin = Some(tag);
                    dangling = true;
                }
                TenseToken::Form(form) => {
                    if !is_upper_word(form) {
                        return Err(format!("definition contains a conjugation '{form}' that is not uppercase"));
                    }
                    tense.push(ConjugationForm {
                        surface: form.to_string(),
                        origin: origin.map(str::to_string),
                    });
                    dangling = false;
                }
            }
        }
        if dangling {
            return Err(format!("conjugation origin marker is not followed by a form: '{}'", raw.trim()));
        }
        if tense.is_empty() {
            return Err("definition contains an empty tense".into());
        }
        tenses.push(tense);
    }
    Ok(tenses)
}

// ---------------------------------------------------------------------------
// Alt spellings + misspellings
// ---------------------------------------------------------------------------

fn parse_alts(text: &str, word: &str, segment: &str, ctx: ParseContext<'_>) -> Result<Vec<String>, Diagnostic> {
    let mut alts: Vec<String> = Vec::new();
    for alt in text.split(',').map(str::trim) {
        if alt.is_empty() {
            return Err(Diagnostic::structural(word, Some(segment), "definition contains an empty alt spelling"));
        }
        if !is_upper_word(alt) {
            return Err(Diagnostic::structural(
                word,
                Some(segment),
                format!("alt spelling '{alt}' is not uppercase"),
            ));
        }
        if !ctx.known.contains(alt) {
            return Err(Diagnostic::reference(
                word,
                Some(segment),
                format!("alt spelling '{alt}' is not a valid word"),
            ));
        }
        if !alts.iter().any(|a| a == alt) {
            alts.push(alt.to_string());
        }
    }
    Ok(alts)
}

fn find_misspellings(definition: &str, ctx: ParseContext<'_>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for token in definition.split_whitespace() {
        let len = token.chars().count();
        if !(MISSPELLING_MIN_LEN..=MISSPELLING_MAX_LEN).contains(&len) {
            continue;
        }
        if !token.chars().all(|c| c.is_alphabetic() && c.is_lowercase()) {
            continue;
        }
        if ctx.accepted.iter().any(|w| w == token) {
            continue;
        }
        let upper = token.to_uppercase();
        if !ctx.known.contains(&upper) && !found.contains(&upper) {
            found.push(upper);
        }
    }
    found
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
