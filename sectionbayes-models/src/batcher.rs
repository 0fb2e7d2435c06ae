use sectionbayes_core::{Result, SectionBayesError};
use tracing::info;

/// Destination for formatted prediction lines.
///
/// A run calls [`write_batch`](PredictionSink::write_batch) once per flushed
/// batch. The first call of a run must start from an empty destination; every
/// later call appends.
pub trait PredictionSink {
    fn write_batch(&mut self, lines: &[String]) -> Result<()>;
}

impl<S: PredictionSink + ?Sized> PredictionSink for &mut S {
    fn write_batch(&mut self, lines: &[String]) -> Result<()> {
        (**self).write_batch(lines)
    }
}

/// In-memory sink that keeps every batch it receives.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    batches: Vec<Vec<String>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> &[Vec<String>] {
        &self.batches
    }

    /// All lines written so far, in order.
    pub fn lines(&self) -> impl Iterator<Item = &String> + '_ {
        self.batches.iter().flatten()
    }
}

impl PredictionSink for VecSink {
    fn write_batch(&mut self, lines: &[String]) -> Result<()> {
        self.batches.push(lines.to_vec());
        Ok(())
    }
}

/// Counters reported once a [`Batcher`] is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    /// Lines handed to the sink.
    pub documents: usize,
    /// Calls to the sink, the final one included.
    pub flushes: usize,
}

/// Buffers prediction lines and hands them to a sink every `batch_size`
/// documents, keeping memory bounded on large test sets.
///
/// [`finish`](Batcher::finish) always performs one last flush, even when the
/// buffer is empty, so a run over zero documents still leaves a fresh, empty
/// destination.
pub struct Batcher<'s, S: PredictionSink + ?Sized> {
    sink: &'s mut S,
    batch_size: usize,
    buffer: Vec<String>,
    stats: BatchStats,
}

impl<'s, S: PredictionSink + ?Sized> Batcher<'s, S> {
    /// # Errors
    ///
    /// - [`SectionBayesError::InvalidHyperparameter`] if `batch_size` is 0
    pub fn new(sink: &'s mut S, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(SectionBayesError::InvalidHyperparameter {
                name: "batch_size".into(),
                value: "0".into(),
            });
        }

        Ok(Self {
            sink,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            stats: BatchStats::default(),
        })
    }

    pub fn push(&mut self, line: String) -> Result<()> {
        self.buffer.push(line);
        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Lines waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn flush(&mut self) -> Result<()> {
        self.stats.flushes += 1;
        info!(
            batch = self.stats.flushes,
            lines = self.buffer.len(),
            "saving results so far"
        );

        self.sink.write_batch(&self.buffer)?;
        self.stats.documents += self.buffer.len();
        self.buffer.clear();
        Ok(())
    }

    /// Flushes whatever is left and reports the totals.
    pub fn finish(mut self) -> Result<BatchStats> {
        self.flush()?;
        Ok(self.stats)
    }
}
