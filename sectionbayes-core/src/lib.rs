pub mod config;
pub mod error;
pub mod types;
pub mod vector;

pub use types::{section_of, ClassLabel, Count, FeatureId, Float, Section};

pub use error::{Result, SectionBayesError};

pub use config::{ClassifierConfig, MalformedPolicy, RankOrder, Smoothing};
pub use vector::{DocumentVector, QueryRecord, TrainingRecord};
