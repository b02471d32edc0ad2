// Policy file lookup: --config PATH, else <config dir>/lexcanon/policy.toml,
// else built-in defaults. The --policy flag overrides the file.

use std::path::{Path, PathBuf};

use lexcanon_engine::{LexiconPolicy, MisspellingPolicy};

use crate::exit_codes;
use crate::fetch::parse_source_url;
use crate::CliError;

pub const POLICY_FILE: &str = "policy.toml";

/// `<config dir>/lexcanon/policy.toml`, when the platform has a config dir.
pub fn default_policy_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lexcanon").join(POLICY_FILE))
}

/// Resolve the active policy.
pub fn load_policy(
    explicit: Option<&Path>,
    misspelling: Option<MisspellingPolicy>,
) -> Result<LexiconPolicy, CliError> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CliError {
                    code: exit_codes::EXIT_CONFIG,
                    message: format!("config file not found: {}", path.display()),
                    hint: None,
                });
            }
            Some(path.to_path_buf())
        }
        None => default_policy_path().filter(|p| p.exists()),
    };

    let policy = match path {
        Some(path) => read_policy(&path)?,
        None => {
            log::debug!("no policy file, using defaults");
            LexiconPolicy::default()
        }
    };

    Ok(match misspelling {
        Some(m) => policy.with_misspelling_policy(m),
        None => policy,
    })
}

fn read_policy(path: &Path) -> Result<LexiconPolicy, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: exit_codes::EXIT_CONFIG,
        message: format!("cannot read {}: {e}", path.display()),
        hint: None,
    })?;

    let policy = LexiconPolicy::from_toml(&text).map_err(|e| CliError {
        code: exit_codes::lexicon_exit_code(&e),
        message: format!("{}: {e}", path.display()),
        hint: None,
    })?;

    if let Some(url) = &policy.source.url {
        parse_source_url(url).map_err(|msg| CliError {
            code: exit_codes::EXIT_CONFIG,
            message: format!("{}: {msg}", path.display()),
            hint: Some("[source] url must be the sheet's published TSV export".to_string()),
        })?;
    }

    log::info!("policy loaded from {}", path.display());
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_file_is_read_and_flag_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(
            &path,
            "[misspelling]\npolicy = \"draft\"\n\n[exceptions]\nroot_words = [\"BE\"]\n",
        )
        .unwrap();

        let policy = load_policy(Some(&path), None).unwrap();
        assert_eq!(policy.misspelling.policy, MisspellingPolicy::Draft);
        assert!(policy.exceptions.is_exempt("BE"));

        let policy = load_policy(Some(&path), Some(MisspellingPolicy::Strict)).unwrap();
        assert_eq!(policy.misspelling.policy, MisspellingPolicy::Strict);
    }

    #[test]
    fn missing_explicit_file_is_config_error() {
        let err = load_policy(Some(Path::new("/nonexistent/policy.toml")), None).unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_CONFIG);
    }

    #[test]
    fn invalid_weights_are_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "[plurality]\norigin_weight = 1\nlength_weight = 1\n").unwrap();
        let err = load_policy(Some(&path), None).unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_CONFIG);
        assert!(err.message.contains("origin_weight"));
    }

    #[test]
    fn malformed_source_url_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "[source]\nurl = \"file:///tmp/sheet.tsv\"\n").unwrap();
        let err = load_policy(Some(&path), None).unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_CONFIG);
        assert!(err.hint.is_some());
    }
}
