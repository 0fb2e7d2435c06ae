//! End-to-end pipeline: train from one file, predict another, stream results to a third.

use std::path::Path;

use sectionbayes_core::{ClassifierConfig, Result};
use sectionbayes_models::{FitSummary, PredictionSummary, SectionNaiveBayes};
use tracing::info;

use crate::io::{FileSink, LineReader};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub fit: FitSummary,
    pub prediction: PredictionSummary,
}

/// Trains on `train`, predicts every line of `test`, and writes one result line
/// per test document to `results`.
///
/// The results file is truncated once training succeeds, before the test file
/// is opened, and appended to batch by batch afterwards. Any later error aborts
/// the run; batches already flushed stay on disk.
pub fn run(
    train: impl AsRef<Path>,
    test: impl AsRef<Path>,
    results: impl AsRef<Path>,
    config: ClassifierConfig,
) -> Result<RunSummary> {
    let (train, test, results) = (train.as_ref(), test.as_ref(), results.as_ref());

    let mut model = SectionNaiveBayes::new(config);

    info!(path = %train.display(), "reading training file");
    let fit = model.fit_lines(LineReader::open(train)?)?;

    let mut sink = FileSink::new(results);
    sink.start()?;

    info!(path = %test.display(), "reading test file");
    let test_lines = LineReader::open(test)?;

    let prediction = model.predict_stream(test_lines, &mut sink)?;

    info!(path = %results.display(), documents = prediction.documents, "results written");

    Ok(RunSummary { fit, prediction })
}
