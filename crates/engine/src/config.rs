use serde::Deserialize;

use crate::error::LexiconError;

/// Longest definition text the length tie-break is expected to see. The origin
/// weight must outrank any length difference below this.
pub const MAX_DEFINITION_LEN: u64 = 500;

// ---------------------------------------------------------------------------
// Top-level policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LexiconPolicy {
    #[serde(default)]
    pub misspelling: MisspellingConfig,
    #[serde(default)]
    pub plurality: PluralityConfig,
    #[serde(default)]
    pub exceptions: ExceptionConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

// ---------------------------------------------------------------------------
// Misspelling
// ---------------------------------------------------------------------------

/// How unrecognized lowercase definition words are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisspellingPolicy {
    /// Misspellings are fatal. Used before publishing.
    #[default]
    Strict,
    /// Misspellings are reported as tags on the word.
    Draft,
}

impl std::fmt::Display for MisspellingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Draft => write!(f, "draft"),
        }
    }
}

impl std::str::FromStr for MisspellingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "draft" => Ok(Self::Draft),
            other => Err(format!("unknown misspelling policy '{other}' (expected strict or draft)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MisspellingConfig {
    #[serde(default)]
    pub policy: MisspellingPolicy,
    /// Lowercase function words that never count as misspellings.
    #[serde(default = "default_accepted_words")]
    pub accepted_words: Vec<String>,
}

impl Default for MisspellingConfig {
    fn default() -> Self {
        Self {
            policy: MisspellingPolicy::default(),
            accepted_words: default_accepted_words(),
        }
    }
}

fn default_accepted_words() -> Vec<String> {
    [
        "an", "and", "as", "at", "be", "by", "for", "from", "in", "into", "is", "it", "of", "on",
        "or", "the", "to", "with",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}

// ---------------------------------------------------------------------------
// Plurality
// ---------------------------------------------------------------------------

/// Scoring for canonical definition selection:
/// `origin_weight * has_origin + length_weight * char_len`.
#[derive(Debug, Clone, Deserialize)]
pub struct PluralityConfig {
    #[serde(default = "default_origin_weight")]
    pub origin_weight: u64,
    #[serde(default = "default_length_weight")]
    pub length_weight: u64,
    /// Origin tags excluded from the origin vote and never overwritten.
    #[serde(default = "default_special_origins")]
    pub special_origins: Vec<String>,
}

impl Default for PluralityConfig {
    fn default() -> Self {
        Self {
            origin_weight: default_origin_weight(),
            length_weight: default_length_weight(),
            special_origins: default_special_origins(),
        }
    }
}

fn default_origin_weight() -> u64 {
    1000
}

fn default_length_weight() -> u64 {
    1
}

fn default_special_origins() -> Vec<String> {
    ["obsolete", "archaic", "Spenser", "Milton"].iter().map(|s| s.to_string()).collect()
}

impl PluralityConfig {
    pub fn is_special_origin(&self, origin: &str) -> bool {
        self.special_origins.iter().any(|s| s == origin)
    }
}

// ---------------------------------------------------------------------------
// Exceptions + Source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionConfig {
    /// Words exempt from root-definition matching and conjugation completeness.
    #[serde(default = "default_root_exceptions")]
    pub root_words: Vec<String>,
}

impl Default for ExceptionConfig {
    fn default() -> Self {
        Self { root_words: default_root_exceptions() }
    }
}

fn default_root_exceptions() -> Vec<String> {
    ["LOAST", "LOSEN", "SURBET"].iter().map(|s| s.to_string()).collect()
}

impl ExceptionConfig {
    pub fn is_exempt(&self, word: &str) -> bool {
        self.root_words.iter().any(|w| w == word)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Published TSV export of the crowdsourcing sheet.
    #[serde(default)]
    pub url: Option<String>,
    /// Where the fetched edition is written.
    #[serde(default = "default_source_output")]
    pub output: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { url: None, output: default_source_output() }
    }
}

fn default_source_output() -> String {
    "latest_edition.txt".to_string()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl LexiconPolicy {
    pub fn from_toml(input: &str) -> Result<Self, LexiconError> {
        let policy: LexiconPolicy =
            toml::from_str(input).map_err(|e| LexiconError::ConfigParse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), LexiconError> {
        let p = &self.plurality;
        if p.origin_weight == 0 || p.length_weight == 0 {
            return Err(LexiconError::ConfigValidation(
                "plurality weights must be greater than zero".into(),
            ));
        }

        // Origin presence has to dominate any length difference
        if p.origin_weight <= p.length_weight.saturating_mul(MAX_DEFINITION_LEN) {
            return Err(LexiconError::ConfigValidation(format!(
                "origin_weight ({}) must exceed length_weight * {MAX_DEFINITION_LEN} ({})",
                p.origin_weight,
                p.length_weight.saturating_mul(MAX_DEFINITION_LEN),
            )));
        }

        for word in &self.exceptions.root_words {
            if !crate::grammar::is_upper_word(word) {
                return Err(LexiconError::ConfigValidation(format!(
                    "exception word '{word}' is not uppercase"
                )));
            }
        }

        for word in &self.misspelling.accepted_words {
            if word.chars().any(|c| c.is_uppercase()) {
                return Err(LexiconError::ConfigValidation(format!(
                    "accepted word '{word}' must be lowercase"
                )));
            }
        }

        Ok(())
    }

    pub fn with_misspelling_policy(mut self, policy: MisspellingPolicy) -> Self {
        self.misspelling.policy = policy;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let policy = LexiconPolicy::from_toml("").unwrap();
        assert_eq!(policy.misspelling.policy, MisspellingPolicy::Strict);
        assert_eq!(policy.plurality.origin_weight, 1000);
        assert_eq!(policy.plurality.length_weight, 1);
        assert!(policy.plurality.is_special_origin("archaic"));
        assert!(policy.exceptions.is_exempt("LOSEN"));
        assert_eq!(policy.source.output, "latest_edition.txt");
        assert!(policy.source.url.is_none());
    }

    #[test]
    fn parse_full_config() {
        let input = r#"
[misspelling]
policy = "draft"
accepted_words = ["of", "the"]

[plurality]
origin_weight = 5000
length_weight = 2
special_origins = ["archaic"]

[exceptions]
root_words = ["FOO"]

[source]
url = "https://example.com/export?format=tsv"
output = "edition.tsv"
"#;
        let policy = LexiconPolicy::from_toml(input).unwrap();
        assert_eq!(policy.misspelling.policy, MisspellingPolicy::Draft);
        assert_eq!(policy.misspelling.accepted_words, vec!["of", "the"]);
        assert_eq!(policy.plurality.origin_weight, 5000);
        assert!(!policy.plurality.is_special_origin("Milton"));
        assert!(policy.exceptions.is_exempt("FOO"));
        assert!(!policy.exceptions.is_exempt("LOSEN"));
        assert_eq!(policy.source.output, "edition.tsv");
    }

    #[test]
    fn reject_origin_weight_that_does_not_dominate() {
        let input = r#"
[plurality]
origin_weight = 100
length_weight = 1
"#;
        let err = LexiconPolicy::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("must exceed"));
    }

    #[test]
    fn reject_zero_weight() {
        let err = LexiconPolicy::from_toml("[plurality]\nlength_weight = 0\n").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn reject_lowercase_exception() {
        let err = LexiconPolicy::from_toml("[exceptions]\nroot_words = [\"losen\"]\n").unwrap_err();
        assert!(err.to_string().contains("'losen'"));
    }

    #[test]
    fn reject_unknown_policy_name() {
        let err = LexiconPolicy::from_toml("[misspelling]\npolicy = \"loose\"\n");
        assert!(err.is_err(), "typo in policy should fail deserialization");
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("draft".parse::<MisspellingPolicy>().unwrap(), MisspellingPolicy::Draft);
        assert!("lenient".parse::<MisspellingPolicy>().is_err());
    }
}
