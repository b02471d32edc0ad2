// Report files written by `create`

use std::fs;
use std::path::{Path, PathBuf};

use lexcanon_engine::Report;

use crate::IoError;

pub const OUT_FILE: &str = "out.tsv";
pub const NEW_DEFINITIONS_FILE: &str = "new_definitions.txt";
pub const AUTOSUGGESTIONS_FILE: &str = "autosuggestions.tsv";

/// Paths of the files written for one report.
#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub out: PathBuf,
    pub new_definitions: PathBuf,
    pub autosuggestions: PathBuf,
}

/// Write all three report files into `dir`, creating it if needed.
pub fn write_report(report: &Report, dir: &Path) -> Result<ReportFiles, IoError> {
    fs::create_dir_all(dir).map_err(|e| IoError::write(dir, e))?;

    let files = ReportFiles {
        out: dir.join(OUT_FILE),
        new_definitions: dir.join(NEW_DEFINITIONS_FILE),
        autosuggestions: dir.join(AUTOSUGGESTIONS_FILE),
    };

    write_rows(
        &files.out,
        report.rows.iter().map(|r| {
            [r.word.clone(), r.original.clone(), r.suggested_or_empty().to_string(), r.tag_string()]
        }),
    )?;

    fs::write(&files.new_definitions, new_definitions_log(report))
        .map_err(|e| IoError::write(&files.new_definitions, e))?;

    write_rows(
        &files.autosuggestions,
        report
            .autosuggestions()
            .map(|(word, original, suggested)| [word, original, suggested].map(str::to_string)),
    )?;

    log::info!(
        "wrote {} row(s) to {}, {} autosuggestion(s)",
        report.rows.len(),
        files.out.display(),
        report.summary.changed_rows
    );
    Ok(files)
}

/// `New Definitions:` log: one block per flagged row, fields on separate
/// lines, blank line between blocks, `Total: N` footer.
pub fn new_definitions_log(report: &Report) -> String {
    let mut out = String::from("New Definitions:\n");
    let mut total = 0usize;
    for row in report.flagged_rows() {
        out.push_str(&row.word);
        out.push('\n');
        out.push_str(&row.original);
        out.push('\n');
        out.push_str(row.suggested_or_empty());
        out.push('\n');
        out.push_str(&row.tag_string());
        out.push_str("\n\n");
        total += 1;
    }
    out.push_str(&format!("Total: {total}\n"));
    out
}

fn write_rows<I, R>(path: &Path, rows: I) -> Result<(), IoError>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| IoError::write(path, e))?;
    for row in rows {
        writer.write_record(row.as_ref()).map_err(|e| IoError::write(path, e))?;
    }
    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}
