pub mod io;
pub mod run;

// Re-export public API
pub use sectionbayes_core::*;
pub use sectionbayes_models::*;

pub use io::{FileSink, LineReader, WriteMode};
pub use run::{run, RunSummary};
