//! Two-phase lexicon loading.
//!
//! Alt-spelling validation needs the complete vocabulary, so the first pass
//! only splits lines and collects words. Segments are parsed afterwards.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Diagnostic;
use crate::grammar::is_upper_word;

/// Separator between definition segments of one word.
pub const SEGMENT_SEPARATOR: &str = " / ";

/// Output of the first loading pass.
#[derive(Debug, Default)]
pub struct LoadedLexicon {
    /// Every word seen, for alt-spelling and misspelling checks.
    pub known: FxHashSet<String>,
    /// Word -> authored definition field, kept for diffing.
    pub originals: FxHashMap<String, String>,
    /// Words in first-appearance order.
    pub order: Vec<String>,
    /// (word, segment) pairs awaiting the parser, in authored order.
    pub segments: Vec<(String, String)>,
}

/// Split raw `WORD<TAB>definition` lines. Every bad line is reported; good
/// lines are still loaded so later stages can report their own problems.
pub fn load_lines<'a, I>(lines: I) -> (LoadedLexicon, Vec<Diagnostic>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut loaded = LoadedLexicon::default();
    let mut diagnostics = Vec::new();

    for (idx, raw) in lines.into_iter().enumerate() {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        let line_label = format!("line {}", idx + 1);

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 2 {
            diagnostics.push(Diagnostic::structural(
                &line_label,
                Some(line),
                "line does not have exactly one tab",
            ));
            continue;
        }

        let word = fields[0].trim();
        let definition = fields[1].trim();
        if word.is_empty() {
            diagnostics.push(Diagnostic::structural(&line_label, Some(line), "word is empty"));
            continue;
        }
        if definition.is_empty() {
            diagnostics.push(Diagnostic::structural(word, Some(line), "definition is empty"));
            continue;
        }
        if !is_upper_word(word) {
            diagnostics.push(Diagnostic::structural(word, Some(line), "word is not uppercase"));
            continue;
        }
        if loaded.originals.contains_key(word) {
            diagnostics.push(Diagnostic::structural(word, Some(line), "word appears on more than one line"));
            continue;
        }

        loaded.known.insert(word.to_string());
        loaded.originals.insert(word.to_string(), definition.to_string());
        loaded.order.push(word.to_string());
    }

    // Segments are split only after the vocabulary is complete
    for word in &loaded.order {
        let definition = &loaded.originals[word];
        for segment in definition.split(SEGMENT_SEPARATOR) {
            loaded.segments.push((word.clone(), segment.to_string()));
        }
    }

    log::debug!(
        "loaded {} words, {} segments, {} line errors",
        loaded.order.len(),
        loaded.segments.len(),
        diagnostics.len()
    );

    (loaded, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_words_and_segments() {
        let input = "CAT\tA small feline. [n] / to vomit [v]\nDOG\tA canine. [n]\n";
        let (loaded, diagnostics) = load_lines(input.lines());
        assert!(diagnostics.is_empty());
        assert_eq!(loaded.order, vec!["CAT", "DOG"]);
        assert_eq!(loaded.segments.len(), 3);
        assert_eq!(loaded.segments[1], ("CAT".to_string(), "to vomit [v]".to_string()));
        assert_eq!(loaded.originals["CAT"], "A small feline. [n] / to vomit [v]");
        assert!(loaded.known.contains("DOG"));
    }

    #[test]
    fn collects_every_bad_line() {
        let input = "CAT\n\tdef [n]\nDOG\t \ndog\tA canine. [n]\nA\tB\tC\nEMU\tA bird. [n]\n";
        let (loaded, diagnostics) = load_lines(input.lines());
        assert_eq!(diagnostics.len(), 5);
        assert!(diagnostics[0].message.contains("exactly one tab"));
        assert_eq!(diagnostics[0].word, "line 1");
        assert!(diagnostics[1].message.contains("word is empty"));
        assert!(diagnostics[2].message.contains("definition is empty"));
        assert!(diagnostics[3].message.contains("not uppercase"));
        assert!(diagnostics[4].message.contains("exactly one tab"));
        assert_eq!(loaded.order, vec!["EMU"]);
    }

    #[test]
    fn duplicate_word_is_structural() {
        let input = "CAT\tA feline. [n]\nCAT\tA lash. [n]\n";
        let (loaded, diagnostics) = load_lines(input.lines());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("more than one line"));
        assert_eq!(loaded.originals["CAT"], "A feline. [n]");
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let input = "CAT\tA feline. [n]\r\n\r\n   \nDOG\tA canine. [n]\r\n";
        let (loaded, diagnostics) = load_lines(input.split('\n'));
        assert!(diagnostics.is_empty());
        assert_eq!(loaded.originals["CAT"], "A feline. [n]");
        assert_eq!(loaded.order.len(), 2);
    }

    #[test]
    fn vocabulary_includes_words_defined_later() {
        let input = "CAT\tA feline, also KAT [n]\nKAT\tA feline. [n]\n";
        let (loaded, _) = load_lines(input.lines());
        assert!(loaded.known.contains("KAT"));
        assert_eq!(loaded.segments[0].0, "CAT");
    }
}
