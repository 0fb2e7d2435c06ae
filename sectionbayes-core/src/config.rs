//! Classifier configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, SectionBayesError};

/// Denominator used for a (feature, class) pair never seen in training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    /// `1 / (total feature mass + vocabulary size)`
    #[default]
    MassPlusVocabulary,
    /// `1 / (total feature mass + 1)`
    MassPlusLaplace,
}

/// Direction in which the top-k labels of a document are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    #[default]
    MostProbableFirst,
    MostProbableLast,
}

/// What to do with a line that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Stop the whole run.
    #[default]
    Abort,
    /// Log a warning and continue with the next line.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Number of documents between two flushes of the prediction buffer.
    pub batch_size: usize,
    /// Number of classes emitted per document.
    pub top_k: usize,
    pub smoothing: Smoothing,
    pub rank_order: RankOrder,
    pub on_malformed: MalformedPolicy,
    /// Label used to fill a line when fewer than `top_k` classes exist.
    pub padding_label: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            top_k: 3,
            smoothing: Smoothing::default(),
            rank_order: RankOrder::default(),
            on_malformed: MalformedPolicy::default(),
            padding_label: "-".to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClassifierConfig =
            toml::from_str(content).map_err(|e| SectionBayesError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| SectionBayesError::from_io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// # Errors
    ///
    /// - [`SectionBayesError::InvalidHyperparameter`] if `batch_size` or `top_k` is 0
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(SectionBayesError::InvalidHyperparameter {
                name: "batch_size".into(),
                value: "0".into(),
            });
        }

        if self.top_k == 0 {
            return Err(SectionBayesError::InvalidHyperparameter {
                name: "top_k".into(),
                value: "0".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.smoothing, Smoothing::MassPlusVocabulary);
        assert_eq!(config.rank_order, RankOrder::MostProbableFirst);
        assert_eq!(config.on_malformed, MalformedPolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ClassifierConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClassifierConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = ClassifierConfig::from_toml_str(
            r#"
            batch_size = 250
            smoothing = "mass_plus_laplace"
            rank_order = "most_probable_last"
            on_malformed = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.smoothing, Smoothing::MassPlusLaplace);
        assert_eq!(config.rank_order, RankOrder::MostProbableLast);
        assert_eq!(config.on_malformed, MalformedPolicy::Skip);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ClassifierConfig::from_toml_str("batchsize = 10");
        assert!(matches!(result, Err(SectionBayesError::Config(_))));
    }

    #[test]
    fn test_zero_batch_size() {
        let result = ClassifierConfig::from_toml_str("batch_size = 0");
        assert!(matches!(
            result,
            Err(SectionBayesError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_zero_top_k() {
        let config = ClassifierConfig {
            top_k: 0,
            ..ClassifierConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SectionBayesError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClassifierConfig::load("/definitely/not/here.toml");
        assert!(matches!(result, Err(SectionBayesError::FileNotFound { .. })));
    }
}
