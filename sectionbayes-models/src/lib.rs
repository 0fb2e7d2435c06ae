pub mod batcher;
pub mod evaluation;
pub mod model;
pub mod naive_bayes;
pub mod ranker;
pub mod raw_counts;
pub mod scorer;

pub use batcher::{BatchStats, Batcher, PredictionSink, VecSink};
pub use evaluation::TopKAccuracy;
pub use model::ModelTables;
pub use naive_bayes::{FitSummary, PredictionSummary, SectionNaiveBayes};
pub use ranker::Ranker;
pub use raw_counts::RawCounts;
pub use scorer::{ClassScores, Scorer};
