use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SectionBayesError {
    /// Input file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Any other failure opening, reading or writing a file.
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Label segment missing or unusable.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A `feature:count` token that is not two numbers around a single `:`.
    #[error("unparseable feature token {token:?} on line {line}")]
    UnknownFeatureToken { line: usize, token: String },

    /// An accumulated count no longer fits in the count type.
    #[error("count overflow while accumulating {what}")]
    CountOverflow { what: String },

    /// The training dataset contains zero documents.
    #[error("training data contains no documents")]
    EmptyTrainingData,

    /// Model used before it was fitted.
    #[error("model used before fitting")]
    NotFitted,

    /// Invalid hyperparameter value.
    #[error("invalid value {value:?} for {name}")]
    InvalidHyperparameter { name: String, value: String },

    /// Configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SectionBayesError {
    /// True for every per-line parse failure, which the skip policy may recover from.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            SectionBayesError::MalformedRecord { .. } | SectionBayesError::UnknownFeatureToken { .. }
        )
    }

    /// Wraps an I/O error, keeping "not found" distinct from other failures.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            SectionBayesError::FileNotFound { path }
        } else {
            SectionBayesError::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, SectionBayesError>;
