//! The run context: load, parse, validate, consolidate, report.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{LexiconPolicy, MisspellingPolicy};
use crate::error::{Diagnostic, DiagnosticKind, LexiconError};
use crate::grammar::{parse_segment, ParseContext};
use crate::graph::AltGraph;
use crate::loader::load_lines;
use crate::model::{NodeKey, WordRecord};
use crate::render::{build_row, Report, ReportSummary};
use crate::resolve::{apply, resolve, Resolution};
use crate::revision::PriorRevision;
use crate::validation::{normalize_abbreviations, validate};

/// Whether a diagnostic aborts the run under the given misspelling policy.
pub fn is_fatal(kind: DiagnosticKind, policy: MisspellingPolicy) -> bool {
    match kind {
        DiagnosticKind::Structural | DiagnosticKind::Reference => true,
        DiagnosticKind::Consistency => false,
        DiagnosticKind::Misspelling => policy == MisspellingPolicy::Strict,
    }
}

/// A fully parsed and validated lexicon.
///
/// Owns the word table and the alt-spelling graph. Building succeeds only if
/// there are no fatal diagnostics.
#[derive(Debug)]
pub struct Lexicon {
    words: Vec<WordRecord>,
    known: FxHashSet<String>,
    graph: AltGraph,
    reserved_seeds: BTreeSet<NodeKey>,
    warnings: Vec<Diagnostic>,
    policy: LexiconPolicy,
}

impl Lexicon {
    pub fn build(input: &str, prior: Option<&str>, policy: &LexiconPolicy) -> Result<Self, LexiconError> {
        let mode = policy.misspelling.policy;
        let mut fatal: Vec<Diagnostic> = Vec::new();
        let mut warnings: Vec<Diagnostic> = Vec::new();

        // 1. Prior revision
        let prior = match prior.map(PriorRevision::parse).transpose() {
            Ok(prior) => prior,
            Err(errors) => return Err(LexiconError::Invalid(errors)),
        };

        // 2. Lines + vocabulary
        let (loaded, line_errors) = load_lines(input.lines());
        fatal.extend(line_errors);

        // 3. Segments
        let mut words: Vec<WordRecord> = Vec::with_capacity(loaded.order.len());
        let mut slot: FxHashMap<&str, usize> = FxHashMap::default();
        for word in &loaded.order {
            slot.insert(word.as_str(), words.len());
            words.push(WordRecord {
                word: word.clone(),
                original: loaded.originals[word].clone(),
                entries: Vec::new(),
                tags: Default::default(),
            });
        }

        let ctx = ParseContext {
            known: &loaded.known,
            accepted: &policy.misspelling.accepted_words,
        };
        for (word, segment) in &loaded.segments {
            let record = &mut words[slot[word.as_str()]];
            match parse_segment(segment, word, ctx) {
                Ok(parsed) => {
                    if !parsed.misspellings.is_empty() {
                        let diagnostic = Diagnostic::misspelling(word, segment, &parsed.misspellings);
                        if is_fatal(diagnostic.kind, mode) {
                            fatal.push(diagnostic);
                        } else {
                            record.tags.add_misspellings(&parsed.misspellings);
                            warnings.push(diagnostic);
                        }
                    }
                    record.entries.push(parsed.entry);
                }
                Err(diagnostic) => fatal.push(diagnostic),
            }
        }

        // 4. Cross-reference checks
        let abbreviated = normalize_abbreviations(&mut words);
        if abbreviated > 0 {
            log::debug!("abbreviated {abbreviated} regular conjugation set(s)");
        }

        let outcome = validate(&mut words, &loaded.known, &policy.exceptions);
        for diagnostic in outcome.diagnostics {
            if is_fatal(diagnostic.kind, mode) {
                fatal.push(diagnostic);
            } else {
                warnings.push(diagnostic);
            }
        }

        if let Some(prior) = &prior {
            warnings.extend(prior.check(&mut words));
        }

        if !fatal.is_empty() {
            log::warn!("lexicon rejected with {} fatal diagnostic(s)", fatal.len());
            return Err(LexiconError::Invalid(fatal));
        }

        // 5. Graph
        let graph = AltGraph::from_words(&words);
        log::info!(
            "parsed {} words into {} graph nodes ({} warning(s))",
            words.len(),
            graph.len(),
            warnings.len()
        );

        Ok(Self {
            words,
            known: loaded.known,
            graph,
            reserved_seeds: outcome.reserved,
            warnings,
            policy: policy.clone(),
        })
    }

    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    pub fn word(&self, word: &str) -> Option<&WordRecord> {
        self.words.iter().find(|w| w.word == word)
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.known.contains(word)
    }

    pub fn graph(&self) -> &AltGraph {
        &self.graph
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Resolve equivalence groups and rewrite every non-reserved entry.
    pub fn consolidate(&mut self) -> Result<Resolution, LexiconError> {
        let resolution = resolve(&mut self.graph, &self.reserved_seeds, &self.policy.plurality);
        let updated = apply(&mut self.words, &resolution, &self.policy.plurality)?;
        log::debug!("rewrote {updated} entr(ies) from {} group(s)", resolution.groups.len());
        Ok(resolution)
    }

    /// Build report rows in input order.
    pub fn report(&self, resolution: &Resolution) -> Report {
        let reserved_words = resolution.reserved_words();
        let rows: Vec<_> = self
            .words
            .iter()
            .map(|record| build_row(record, &reserved_words, self.policy.misspelling.policy))
            .collect();

        let summary = ReportSummary {
            words: self.words.len(),
            entries: self.words.iter().map(|w| w.entries.len()).sum(),
            groups: resolution.groups.len(),
            reserved_nodes: resolution.reserved().len(),
            changed_rows: rows.iter().filter(|r| r.suggested.is_some()).count(),
            flagged_rows: rows.iter().filter(|r| r.is_flagged()).count(),
        };

        Report {
            rows,
            summary,
            warnings: self.warnings.clone(),
        }
    }
}

/// Run the whole pipeline over one lexicon text.
///
/// Fails with [`LexiconError::Invalid`] carrying every fatal diagnostic, or
/// [`LexiconError::Internal`] if consolidation meets an entry with no group.
pub fn run(input: &str, prior: Option<&str>, policy: &LexiconPolicy) -> Result<Report, LexiconError> {
    let mut lexicon = Lexicon::build(input, prior, policy)?;
    let resolution = lexicon.consolidate()?;
    let report = lexicon.report(&resolution);
    log::info!(
        "{} word(s), {} group(s), {} changed, {} flagged",
        report.summary.words,
        report.summary.groups,
        report.summary.changed_rows,
        report.summary.flagged_rows
    );
    Ok(report)
}
