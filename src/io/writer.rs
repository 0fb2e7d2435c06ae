use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sectionbayes_core::{Result, SectionBayesError};
use sectionbayes_models::PredictionSink;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create the file, discarding any previous content.
    Truncate,
    /// Create the file if needed and write after any existing content.
    Append,
}

/// Writes `lines` to `path`, one per line, in the given mode.
pub fn write_lines(path: impl AsRef<Path>, lines: &[String], mode: WriteMode) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| SectionBayesError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    match mode {
        WriteMode::Truncate => options.write(true).create(true).truncate(true),
        WriteMode::Append => options.append(true).create(true),
    };

    let file = options.open(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);

    for line in lines {
        writeln!(out, "{line}").map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;

    Ok(())
}

/// [`PredictionSink`] backed by a results file.
///
/// The file is truncated once, by [`start`](FileSink::start) or else by the
/// first batch; every later batch appends.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    started: bool,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            started: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empties the results file up front, so a run that fails before its
    /// first flush does not leave a previous run's results behind.
    pub fn start(&mut self) -> Result<()> {
        debug!(path = %self.path.display(), "truncating results file");
        write_lines(&self.path, &[], WriteMode::Truncate)?;
        self.started = true;
        Ok(())
    }
}

impl PredictionSink for FileSink {
    fn write_batch(&mut self, lines: &[String]) -> Result<()> {
        let mode = if self.started {
            WriteMode::Append
        } else {
            WriteMode::Truncate
        };

        debug!(path = %self.path.display(), ?mode, lines = lines.len(), "writing batch");
        write_lines(&self.path, lines, mode)?;
        self.started = true;
        Ok(())
    }
}
