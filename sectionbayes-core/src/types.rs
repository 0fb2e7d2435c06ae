/// Floating point type used for every probability and log-score.
pub type Float = f64;

/// A class label as it appears in the leading field of a document line.
pub type ClassLabel = String;

/// Coarse grouping of classes: the first character of a class label.
pub type Section = char;

/// Sparse feature identifier.
pub type FeatureId = i64;

/// Integer occurrence count recorded at training time.
pub type Count = i64;

/// Returns the section a class label belongs to.
///
/// Labels are validated as non-empty by the vector parser, so `None` only
/// shows up for labels built by hand.
pub fn section_of(label: &str) -> Option<Section> {
    label.chars().next()
}
