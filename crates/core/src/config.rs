use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the whole pipeline.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub headings: HeadingConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// Lines longer than this (in characters) are never "short".
    pub max_heading_chars: usize,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            max_heading_chars: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Exam-relevance terms, matched case-insensitively on word boundaries.
    pub keywords: Vec<String>,
    /// Added to the raw score once per keyword occurrence.
    pub boost_factor: f64,
    /// Lowest normalized score ranked `High`.
    pub high_threshold: f64,
    /// Lowest normalized score ranked `Medium`.
    pub medium_threshold: f64,
    /// Maximum snippet length in characters.
    pub snippet_chars: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            keywords: [
                "definition",
                "theorem",
                "proof",
                "example",
                "exercise",
                "important",
                "properties",
                "application",
                "previous year question",
                "pyq",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            boost_factor: 0.2,
            high_threshold: 0.66,
            medium_threshold: 0.33,
            snippet_chars: 200,
        }
    }
}

impl StudyConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: StudyConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load from `path` when given, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;
        for (name, value) in [
            ("high_threshold", s.high_threshold),
            ("medium_threshold", s.medium_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if s.medium_threshold > s.high_threshold {
            return Err(ConfigError::Invalid(format!(
                "medium_threshold ({}) must not exceed high_threshold ({})",
                s.medium_threshold, s.high_threshold
            )));
        }
        if !s.boost_factor.is_finite() || s.boost_factor < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "boost_factor must be a finite non-negative number, got {}",
                s.boost_factor
            )));
        }
        if s.snippet_chars == 0 {
            return Err(ConfigError::Invalid("snippet_chars must be positive".into()));
        }
        if self.headings.max_heading_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_heading_chars must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
