//! Canonical serialization of entries and the per-word report rows.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Serialize;

use crate::config::MisspellingPolicy;
use crate::error::Diagnostic;
use crate::grammar::ALSO_MARKER;
use crate::loader::SEGMENT_SEPARATOR;
use crate::model::{Entry, Sense, Tense, WordRecord};

pub const TAG_MULTI_SENSE_ROOT: &str = "MultiPOSDef Root";
pub const TAG_ROOT_STATUS_CHANGED: &str = "Root Status Changed";
pub const TAG_MISSING_CONJUGATION: &str = "Missing Conjugation";
pub const TAG_MISSPELLING: &str = "Misspelling";
pub const TAG_AUTOSUGGESTION: &str = "Autosuggestion";

// ---------------------------------------------------------------------------
// Entry text
// ---------------------------------------------------------------------------

/// Render one entry in the definition grammar.
pub fn render_entry(entry: &Entry) -> String {
    let mut out = String::new();

    if let Sense::Derived { root, intermediate } = &entry.sense {
        if let Some(intermediate) = intermediate {
            out.push_str(intermediate);
            out.push_str(", ");
        }
        out.push_str(root);
        out.push_str(", ");
    }

    if let Some(origin) = &entry.origin {
        let _ = write!(out, "({origin}) ");
    }

    out.push_str(&entry.definition);

    if !entry.alts.is_empty() {
        out.push_str(ALSO_MARKER);
        out.push_str(&entry.alts.join(", "));
    }

    out.push_str(" [");
    out.push_str(entry.pos.tag());
    let tenses = entry.tenses();
    if !tenses.is_empty() {
        out.push(' ');
        let rendered: Vec<String> = tenses.iter().map(render_tense).collect();
        out.push_str(&rendered.join(", "));
    }
    out.push(']');

    out
}

/// Forms joined by ` or `, with an origin marker wherever the origin changes.
fn render_tense(tense: &Tense) -> String {
    let mut parts = Vec::with_capacity(tense.len());
    let mut previous: Option<&str> = None;
    for form in tense {
        let origin = form.origin.as_deref();
        match origin {
            Some(o) if origin != previous => parts.push(format!("({o}) {}", form.surface)),
            _ => parts.push(form.surface.clone()),
        }
        previous = origin;
    }
    parts.join(" or ")
}

/// All segments of a word, joined with ` / `.
pub fn render_word(record: &WordRecord) -> String {
    let segments: Vec<String> = record
        .entries
        .iter()
        .map(render_entry)
        .collect();
    segments.join(SEGMENT_SEPARATOR).trim().to_string()
}

// ---------------------------------------------------------------------------
// Report rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub word: String,
    pub original: String,
    /// Canonical text, present only when it differs from the original.
    pub suggested: Option<String>,
    pub tags: Vec<String>,
}

impl ReportRow {
    pub fn tag_string(&self) -> String {
        self.tags.join(", ")
    }

    pub fn suggested_or_empty(&self) -> &str {
        self.suggested.as_deref().unwrap_or("")
    }

    /// A row with changes or tags. These are logged as new definitions.
    pub fn is_flagged(&self) -> bool {
        self.suggested.is_some() || !self.tags.is_empty()
    }
}

/// Build the report row for one word.
pub fn build_row(
    record: &WordRecord,
    reserved_words: &BTreeSet<&str>,
    policy: MisspellingPolicy,
) -> ReportRow {
    let rendered = render_word(record);
    let suggested = (rendered != record.original).then_some(rendered);

    let mut tags = Vec::new();
    if reserved_words.contains(record.word.as_str()) {
        tags.push(TAG_MULTI_SENSE_ROOT.to_string());
    }
    if record.tags.root_status_changed {
        tags.push(TAG_ROOT_STATUS_CHANGED.to_string());
    }
    if !record.tags.missing_conjugations.is_empty() {
        tags.push(format!(
            "{TAG_MISSING_CONJUGATION}: {}",
            record.tags.missing_conjugations.join(" ")
        ));
    }
    if policy == MisspellingPolicy::Draft && !record.tags.misspellings.is_empty() {
        tags.push(format!("{TAG_MISSPELLING}: {}", record.tags.misspellings.join(" ")));
    }
    if suggested.is_some() {
        tags.push(TAG_AUTOSUGGESTION.to_string());
    }

    ReportRow {
        word: record.word.clone(),
        original: record.original.clone(),
        suggested,
        tags,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub words: usize,
    pub entries: usize,
    pub groups: usize,
    pub reserved_nodes: usize,
    pub changed_rows: usize,
    /// Rows with changes or tags.
    pub flagged_rows: usize,
}

/// Everything a run produces. Rows follow first appearance in the input.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
    /// Non-fatal diagnostics.
    pub warnings: Vec<Diagnostic>,
}

impl Report {
    pub fn flagged_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|r| r.is_flagged())
    }

    pub fn autosuggestions(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.rows
            .iter()
            .filter_map(|r| r.suggested.as_deref().map(|s| (r.word.as_str(), r.original.as_str(), s)))
    }

    pub fn row(&self, word: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.word == word)
    }
}
