use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use sectionbayes_core::{Result, SectionBayesError};

/// Streams the lines of a text file in order without loading it whole.
///
/// A missing file is reported as [`SectionBayesError::FileNotFound`] when
/// opening; any later read failure as [`SectionBayesError::Io`].
pub struct LineReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl LineReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| SectionBayesError::from_io(&path, e))?;

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for LineReader {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(|line| {
            line.map_err(|source| SectionBayesError::Io {
                path: self.path.clone(),
                source,
            })
        })
    }
}
