//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3       | lexicon          | Lexicon has fatal diagnostics            |
//! | 4       | config           | Policy file missing, unparsable, invalid |
//! | 5       | io               | Input/output file error                  |
//! | 50-59   | fetch            | Published sheet export download          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use lexcanon_engine::LexiconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Lexicon (3-5)
// =============================================================================

/// The lexicon has structural, reference, or (strict) misspelling errors.
/// Nothing was written.
pub const EXIT_INVALID: u8 = 3;

/// Policy config could not be read, parsed, or validated.
pub const EXIT_CONFIG: u8 = 4;

/// Reading the input or writing an output file failed.
pub const EXIT_IO: u8 = 5;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// No source URL configured (neither flag nor policy file).
pub const EXIT_FETCH_NO_SOURCE: u8 = 50;

/// Auth rejected by upstream (401/403).
pub const EXIT_FETCH_AUTH: u8 = 51;

/// Bad request rejected by upstream (400).
pub const EXIT_FETCH_VALIDATION: u8 = 52;

/// Rate limited after retries (429).
pub const EXIT_FETCH_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx), network failure after retries, or a malformed export.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;

/// Map an engine error to its exit code.
pub fn lexicon_exit_code(err: &LexiconError) -> u8 {
    match err {
        LexiconError::Invalid(_) => EXIT_INVALID,
        LexiconError::ConfigParse(_) | LexiconError::ConfigValidation(_) => EXIT_CONFIG,
        LexiconError::Internal(_) => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_INVALID,
            EXIT_CONFIG,
            EXIT_IO,
            EXIT_FETCH_NO_SOURCE,
            EXIT_FETCH_AUTH,
            EXIT_FETCH_VALIDATION,
            EXIT_FETCH_RATE_LIMIT,
            EXIT_FETCH_UPSTREAM,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn engine_errors_map_to_registry() {
        assert_eq!(lexicon_exit_code(&LexiconError::Invalid(vec![])), EXIT_INVALID);
        assert_eq!(lexicon_exit_code(&LexiconError::ConfigParse("x".into())), EXIT_CONFIG);
        assert_eq!(lexicon_exit_code(&LexiconError::ConfigValidation("x".into())), EXIT_CONFIG);
        assert_eq!(lexicon_exit_code(&LexiconError::Internal("x".into())), EXIT_ERROR);
    }
}
