use sectionbayes_core::{
    ClassLabel, ClassifierConfig, MalformedPolicy, QueryRecord, Result, SectionBayesError,
    TrainingRecord,
};
use tracing::{debug, info, warn};

use crate::batcher::{Batcher, PredictionSink};
use crate::evaluation::TopKAccuracy;
use crate::model::ModelTables;
use crate::ranker::Ranker;
use crate::raw_counts::RawCounts;
use crate::scorer::Scorer;

/// Outcome of a training pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitSummary {
    /// Documents recorded in the counts.
    pub documents: u64,
    /// Malformed lines dropped under [`MalformedPolicy::Skip`].
    pub skipped: usize,
}

/// Outcome of a prediction pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionSummary {
    /// Documents predicted and written.
    pub documents: usize,
    /// Malformed lines dropped under [`MalformedPolicy::Skip`].
    pub skipped: usize,
    /// Calls made to the sink, the final one included.
    pub flushes: usize,
    /// Ranking quality against the labels found on the test lines.
    pub accuracy: TopKAccuracy,
}

#[derive(Debug, Clone)]
struct Fitted {
    counts: RawCounts,
    tables: ModelTables,
}

/// **Multinomial Naive Bayes** over a two-level (section, class) hierarchy.
///
/// A section is the first character of a class label. The model scores each
/// class as
///
/// ```text
/// ln P(section) + ln P(class | section) + Σ_f v · ln P(f | class)
/// ```
///
/// and emits the `top_k` best classes per document.
///
/// # Lifecycle
///
/// 1. [`fit_lines`](SectionNaiveBayes::fit_lines) (or
///    [`fit_counts`](SectionNaiveBayes::fit_counts)) aggregates the corpus once
///    and derives the read-only [`ModelTables`].
/// 2. [`predict_stream`](SectionNaiveBayes::predict_stream) scores test lines in
///    batches of `batch_size`, handing each batch of formatted lines to a
///    [`PredictionSink`] before scoring the next one.
///
/// Refitting replaces the previous model entirely; nothing is learned
/// incrementally.
///
/// # Errors
///
/// - [`SectionBayesError::EmptyTrainingData`] if training saw no document
/// - [`SectionBayesError::NotFitted`] if prediction is attempted before fitting
/// - [`SectionBayesError::MalformedRecord`] / [`SectionBayesError::UnknownFeatureToken`]
///   for unparseable lines under [`MalformedPolicy::Abort`]
/// - [`SectionBayesError::InvalidHyperparameter`] for a zero `batch_size` or `top_k`
#[derive(Debug, Clone)]
pub struct SectionNaiveBayes {
    config: ClassifierConfig,
    fitted: Option<Fitted>,
}

impl Default for SectionNaiveBayes {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl SectionNaiveBayes {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Aggregates training lines and builds the model tables.
    ///
    /// Blank lines are ignored. Line numbers in errors are 1-based positions
    /// in `lines`.
    pub fn fit_lines<I, S>(&mut self, lines: I) -> Result<FitSummary>
    where
        I: IntoIterator<Item = Result<S>>,
        S: AsRef<str>,
    {
        self.config.validate()?;

        info!("producing counts per vector from the training lines");

        let mut counts = RawCounts::new();
        let mut skipped = 0;

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line?;
            match TrainingRecord::parse(idx + 1, line.as_ref()) {
                Ok(Some(record)) => counts.record(&record)?,
                Ok(None) => debug!(line = idx + 1, "skipping blank training line"),
                Err(err) => skip_or_abort(self.config.on_malformed, err, &mut skipped)?,
            }
        }

        let documents = counts.document_count();
        self.fit_counts(counts)?;

        info!(documents, skipped, "training complete");
        Ok(FitSummary { documents, skipped })
    }

    /// Builds the model tables from counts aggregated elsewhere.
    pub fn fit_counts(&mut self, counts: RawCounts) -> Result<()> {
        let tables = ModelTables::build(&counts, self.config.smoothing)?;
        self.fitted = Some(Fitted { counts, tables });
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn counts(&self) -> Option<&RawCounts> {
        self.fitted.as_ref().map(|f| &f.counts)
    }

    pub fn tables(&self) -> Option<&ModelTables> {
        self.fitted.as_ref().map(|f| &f.tables)
    }

    /// Borrowing scorer over the fitted model.
    pub fn scorer(&self) -> Result<Scorer<'_>> {
        let fitted = self.fitted.as_ref().ok_or(SectionBayesError::NotFitted)?;
        Ok(Scorer::new(&fitted.counts, &fitted.tables))
    }

    /// Ranks a single encoded line. Returns up to `top_k` classes, most probable
    /// first, or `None` for a blank line. The label field is required but not
    /// used for scoring.
    pub fn predict_line(&self, line_no: usize, line: &str) -> Result<Option<Vec<&str>>> {
        let scorer = self.scorer()?;
        let ranker = Ranker::from_config(&self.config);

        let ranked = QueryRecord::parse(line_no, line)?
            .map(|record| ranker.top_classes(scorer.score_document(&record.features)));

        Ok(ranked)
    }

    /// Scores every test line and streams one formatted line per document to `sink`.
    ///
    /// Lines are parsed and scored `batch_size` at a time; each scored batch is
    /// ranked, handed to the sink, and dropped before the next one is read.
    /// Output lines follow input order. The sink receives one more call after
    /// the last batch, even if it is empty.
    pub fn predict_stream<I, S, K>(&self, lines: I, sink: &mut K) -> Result<PredictionSummary>
    where
        I: IntoIterator<Item = Result<S>>,
        S: AsRef<str>,
        K: PredictionSink + ?Sized,
    {
        self.config.validate()?;
        let scorer = self.scorer()?;
        let ranker = Ranker::from_config(&self.config);
        let batch_size = self.config.batch_size;

        info!(batch_size, top_k = self.config.top_k, "computing predictions");

        let mut batcher = Batcher::new(sink, batch_size)?;
        let mut accuracy = TopKAccuracy::new();
        let mut pending: Vec<QueryRecord> = Vec::with_capacity(batch_size);
        let mut skipped = 0;

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line?;
            debug!(line = idx + 1, "predicting line");

            match QueryRecord::parse(idx + 1, line.as_ref()) {
                Ok(Some(record)) => pending.push(record),
                Ok(None) => debug!(line = idx + 1, "skipping blank test line"),
                Err(err) => skip_or_abort(self.config.on_malformed, err, &mut skipped)?,
            }

            if pending.len() >= batch_size {
                emit_batch(&scorer, &ranker, &mut pending, &mut batcher, &mut accuracy)?;
            }
        }

        emit_batch(&scorer, &ranker, &mut pending, &mut batcher, &mut accuracy)?;
        let stats = batcher.finish()?;

        info!(
            documents = stats.documents,
            flushes = stats.flushes,
            skipped,
            "predictions saved"
        );

        Ok(PredictionSummary {
            documents: stats.documents,
            skipped,
            flushes: stats.flushes,
            accuracy,
        })
    }

    /// Known classes in label order.
    pub fn classes(&self) -> Vec<&ClassLabel> {
        self.tables()
            .map(|t| t.class_log_prob().keys().collect())
            .unwrap_or_default()
    }
}

fn skip_or_abort(
    policy: MalformedPolicy,
    err: SectionBayesError,
    skipped: &mut usize,
) -> Result<()> {
    if policy == MalformedPolicy::Skip && err.is_malformed() {
        warn!(error = %err, "skipping malformed line");
        *skipped += 1;
        return Ok(());
    }
    Err(err)
}

fn emit_batch<K: PredictionSink + ?Sized>(
    scorer: &Scorer<'_>,
    ranker: &Ranker,
    pending: &mut Vec<QueryRecord>,
    batcher: &mut Batcher<'_, K>,
    accuracy: &mut TopKAccuracy,
) -> Result<()> {
    let scored = scorer.score_documents(pending);

    for (record, scores) in pending.iter().zip(scored) {
        let best_first = ranker.top_classes(scores);
        accuracy.observe(&record.classes, &best_first);
        batcher.push(ranker.format_line(&best_first))?;
    }

    pending.clear();
    Ok(())
}
