// Published crowdsourcing sheet export (TSV)
//
// Layout: two header rows, then one row per word:
//   0 word | 1 existing | 2 autosuggested | 3 (unused) | 4 approved new | 5 completed

use std::fs;
use std::path::Path;

use crate::IoError;

/// Header rows before the first word row.
pub const HEADER_ROWS: usize = 2;
/// Minimum columns per word row.
pub const MIN_COLUMNS: usize = 6;

const COL_WORD: usize = 0;
const COL_EXISTING: usize = 1;
const COL_AUTOSUGGESTED: usize = 2;
const COL_NEW: usize = 4;
const COL_COMPLETED: usize = 5;

/// One word row of the sheet, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub word: String,
    pub existing: String,
    pub autosuggested: String,
    pub new: String,
    pub completed: bool,
}

impl SheetRow {
    /// The definition to publish: for completed rows the first non-empty of
    /// new, autosuggested, existing; otherwise the existing definition.
    pub fn edition_definition(&self) -> &str {
        if !self.completed {
            return &self.existing;
        }
        [&self.new, &self.autosuggested, &self.existing]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn is_completed(flag: &str) -> bool {
    matches!(flag.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "x")
}

/// Parse the sheet export body.
pub fn parse_sheet_export(content: &str) -> Result<Vec<SheetRow>, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| IoError::Format(e.to_string()))?;
        if idx < HEADER_ROWS {
            continue;
        }
        if record.len() < MIN_COLUMNS {
            let fields: Vec<&str> = record.iter().collect();
            return Err(IoError::Format(format!(
                "sheet row {} does not have enough columns ({} < {MIN_COLUMNS}): {:?}",
                idx + 1,
                record.len(),
                fields
            )));
        }
        let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        rows.push(SheetRow {
            word: field(COL_WORD),
            existing: field(COL_EXISTING),
            autosuggested: field(COL_AUTOSUGGESTED),
            new: field(COL_NEW),
            completed: is_completed(&field(COL_COMPLETED)),
        });
    }

    log::debug!("parsed {} sheet row(s)", rows.len());
    Ok(rows)
}

/// Render rows as `word<TAB>definition` lines.
pub fn edition_text(rows: &[SheetRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.word);
        out.push('\t');
        out.push_str(row.edition_definition());
        out.push('\n');
    }
    out
}

/// Write the edition file. Returns the number of words written.
pub fn write_edition(rows: &[SheetRow], path: &Path) -> Result<usize, IoError> {
    fs::write(path, edition_text(rows)).map_err(|e| IoError::write(path, e))?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EXPORT: &str = "\
Word\tExisting\tAuto\tNotes\tNew\tDone
header two\t\t\t\t\t
CAT\tA feline. [n]\tA small feline. [n]\t\tA tiny feline. [n]\tTRUE
DOG\tA canine. [n]\tA hound. [n]\t\t\tyes
EMU\tA bird. [n]\tA big bird. [n]\t\tA large bird. [n]\tno
OWL\tA raptor. [n]\t\t\t\tx
";

    #[test]
    fn completed_rows_prefer_new_then_autosuggested() {
        let rows = parse_sheet_export(EXPORT).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].edition_definition(), "A tiny feline. [n]");
        assert_eq!(rows[1].edition_definition(), "A hound. [n]");
        assert_eq!(rows[2].edition_definition(), "A bird. [n]");
        assert_eq!(rows[3].edition_definition(), "A raptor. [n]");
    }

    #[test]
    fn short_row_is_an_error() {
        let content = "h1\nh2\nCAT\tA feline. [n]\n";
        let err = parse_sheet_export(content).unwrap_err();
        assert!(err.to_string().contains("not have enough columns"));
    }

    #[test]
    fn quotes_are_literal() {
        let content = "h1\nh2\nCAT\t\"Puss\" a feline [n]\t\t\t\tfalse\n";
        let rows = parse_sheet_export(content).unwrap();
        assert_eq!(rows[0].existing, "\"Puss\" a feline [n]");
    }

    #[test]
    fn writes_word_tab_definition_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latest_edition.txt");
        let rows = parse_sheet_export(EXPORT).unwrap();
        assert_eq!(write_edition(&rows, &path).unwrap(), 4);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("CAT\tA tiny feline. [n]\nDOG\tA hound. [n]\n"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn completed_flag_is_case_insensitive() {
        assert!(is_completed("True"));
        assert!(is_completed(" X "));
        assert!(is_completed("YES"));
        assert!(!is_completed("done"));
        assert!(!is_completed(""));
    }
}
