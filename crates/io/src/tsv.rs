// Lexicon TSV input

use std::io::Read;
use std::path::Path;

use crate::IoError;

/// Read a lexicon file, decoding it to UTF-8.
pub fn read_lexicon(path: &Path) -> Result<String, IoError> {
    let content = read_file_as_utf8(path)?;
    log::debug!("read {} ({} lines)", path.display(), content.lines().count());
    Ok(content)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;
    Ok(decode_text(bytes))
}

/// UTF-8 with a leading BOM removed, falling back to Windows-1252 (common for
/// spreadsheet exports).
pub fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            log::warn!("input is not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}
