use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{self, owned};
use crate::error::{ExtractError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub batch: BatchConfig,
}

/// Vocabularies and thresholds consulted by the line classifier and cleanup pass
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Smallest bare number accepted as a price when no suffix word follows it
    pub price_threshold: u64,
    pub price_suffixes: Vec<String>,
    pub currency_symbol: String,
    /// Prefixes that already mark a value as a price
    pub currency_markers: Vec<String>,
    pub languages: Vec<String>,
    pub venue_keywords: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            price_threshold: constants::DEFAULT_PRICE_THRESHOLD,
            price_suffixes: owned(constants::DEFAULT_PRICE_SUFFIXES),
            currency_symbol: constants::DEFAULT_CURRENCY_SYMBOL.to_string(),
            currency_markers: owned(constants::DEFAULT_CURRENCY_MARKERS),
            languages: owned(constants::DEFAULT_LANGUAGES),
            venue_keywords: owned(constants::DEFAULT_VENUE_KEYWORDS),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    /// Extension of the per-image inputs, without the dot
    pub input_extension: String,
    pub output_file: PathBuf,
    pub history_dir: PathBuf,
    pub history_suffix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(constants::DEFAULT_INPUT_DIR),
            input_extension: constants::DEFAULT_INPUT_EXTENSION.to_string(),
            output_file: PathBuf::from(constants::DEFAULT_OUTPUT_FILE),
            history_dir: PathBuf::from(constants::DEFAULT_HISTORY_DIR),
            history_suffix: constants::DEFAULT_HISTORY_SUFFIX.to_string(),
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExtractError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load_from`], but an absent file yields the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        info!("Loading config from {}", path.display());
        Self::load_from(path)
    }

    /// Resolves the config path from `EXTRACTOR_CONFIG`, falling back to `config.toml`.
    pub fn load_from_env() -> Result<Self> {
        let path = std::env::var(constants::CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(constants::DEFAULT_CONFIG_PATH));
        Self::load_or_default(&path)
    }

    fn validate(&self) -> Result<()> {
        if self.extraction.currency_symbol.trim().is_empty() {
            return Err(ExtractError::Config("currency_symbol must not be empty".to_string()));
        }
        if self.batch.input_extension.trim().is_empty() {
            return Err(ExtractError::Config("input_extension must not be empty".to_string()));
        }
        if self.batch.history_suffix.contains(['/', '\\']) {
            return Err(ExtractError::Config(format!(
                "history_suffix '{}' must not contain path separators",
                self.batch.history_suffix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[extraction]\nprice_threshold = 100\n\n[batch]\ninput_dir = \"shots\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.extraction.price_threshold, 100);
        assert_eq!(config.extraction.currency_symbol, "₹");
        assert_eq!(config.batch.input_dir, PathBuf::from("shots"));
        assert_eq!(config.batch.history_suffix, "event_details");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.extraction.price_threshold, 50);
        assert_eq!(config.extraction.languages.len(), 6);
    }

    #[test]
    fn test_invalid_suffix_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[batch]\nhistory_suffix = \"a/b\"").unwrap();
        assert!(matches!(Config::load_from(file.path()), Err(ExtractError::Config(_))));
    }
}
