//! File collaborators: a streaming line reader and a truncate/append line writer.

pub mod reader;
pub mod writer;

pub use reader::LineReader;
pub use writer::{write_lines, FileSink, WriteMode};
