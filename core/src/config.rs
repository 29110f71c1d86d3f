//! Configuration for the reconciliation engine.
//!
//! `ReconcileConfig` centralizes the tokenizer flags and the diff ceiling so
//! no behavioral constant is buried in the algorithm modules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Witness language. Drives punctuation classification (RTL quote inversion)
/// and numbering-label digit recognition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "la")]
    Latin,
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "he")]
    Hebrew,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Latin => "la",
            Language::Arabic => "ar",
            Language::Hebrew => "he",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Arabic | Language::Hebrew)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "la" => Ok(Language::Latin),
            "ar" => Ok(Language::Arabic),
            "he" => Ok(Language::Hebrew),
            other => Err(ConfigError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Default diff-engine iteration ceiling, counted in diagonals evaluated.
pub const DEFAULT_MAX_ITERATIONS: u64 = 1_000_000;

/// Configuration for a [`Reconciler`](crate::Reconciler).
///
/// Every field has a default, so partial JSON configs deserialize cleanly.
/// `"max_iterations": null` explicitly disables the diff ceiling; omitting
/// the field keeps the default ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub language: Language,
    pub max_iterations: Option<u64>,
    pub detect_numbering_labels: bool,
    pub detect_intra_word_quotes: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            language: Language::Latin,
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
            detect_numbering_labels: true,
            detect_intra_word_quotes: false,
        }
    }
}

impl ReconcileConfig {
    /// Preset without an iteration ceiling. Worst-case diff cost is quadratic
    /// in the combined sequence length; interactive callers should keep the
    /// default ceiling.
    pub fn unbounded() -> Self {
        ReconcileConfig {
            max_iterations: None,
            ..ReconcileConfig::default()
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<u64>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_numbering_labels(mut self, detect: bool) -> Self {
        self.detect_numbering_labels = detect;
        self
    }

    pub fn with_intra_word_quotes(mut self, detect: bool) -> Self {
        self.detect_intra_word_quotes = detect;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == Some(0) {
            return Err(ConfigError::InvalidMaxIterations);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "[RECOLLATE_CONFIG_001] max_iterations must be at least 1; use null to disable the ceiling"
    )]
    InvalidMaxIterations,
    #[error("[RECOLLATE_CONFIG_002] unknown language code '{0}' (expected la, ar or he)")]
    UnknownLanguage(String),
}
