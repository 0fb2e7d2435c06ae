//! Parsing of encoded document lines.
//!
//! A line looks like
//!
//! ```text
//! c1,c2,...,cn f1:v1 f2:v2 ... fk:vk
//! ```
//!
//! The leading field is a comma-separated list of class labels, followed by
//! whitespace-separated `feature:count` tokens. Training and prediction share
//! the same parser; they only differ in the count type (integer counts at
//! training time, fractional counts accepted at prediction time).

use crate::types::{section_of, ClassLabel, Count, FeatureId, Float, Section};
use crate::{Result, SectionBayesError};

/// A value that can appear on the right-hand side of a `feature:count` token.
///
/// Counts are never negative; fractional counts must also be finite.
pub trait CountValue: Copy {
    fn parse_count(raw: &str) -> Option<Self>;
}

impl CountValue for Count {
    fn parse_count(raw: &str) -> Option<Self> {
        raw.parse().ok().filter(|v: &Count| *v >= 0)
    }
}

impl CountValue for Float {
    fn parse_count(raw: &str) -> Option<Self> {
        raw.parse::<Float>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
    }
}

/// One parsed document line.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentVector<V> {
    /// Class labels in line order, duplicates removed.
    pub classes: Vec<ClassLabel>,
    /// Distinct sections touched by `classes`, in first-seen order.
    pub sections: Vec<Section>,
    /// Sparse `(feature id, count)` pairs in line order.
    pub features: Vec<(FeatureId, V)>,
}

/// A training document: integer counts.
pub type TrainingRecord = DocumentVector<Count>;

/// A document to classify: fractional counts are accepted.
pub type QueryRecord = DocumentVector<Float>;

impl<V: CountValue> DocumentVector<V> {
    /// Parses one line. `line_no` is 1-based and only used in errors.
    ///
    /// Returns `Ok(None)` for a blank line.
    ///
    /// # Errors
    ///
    /// - [`SectionBayesError::MalformedRecord`] if a class label is empty
    /// - [`SectionBayesError::UnknownFeatureToken`] if a feature token does not
    ///   parse as `id:count` with a valid count
    pub fn parse(line_no: usize, line: &str) -> Result<Option<Self>> {
        let mut fields = line.split_ascii_whitespace();

        let label_field = match fields.next() {
            Some(field) => field,
            None => return Ok(None),
        };

        let mut classes: Vec<ClassLabel> = Vec::new();
        let mut sections: Vec<Section> = Vec::new();

        for label in label_field.split(',') {
            let section = section_of(label).ok_or_else(|| SectionBayesError::MalformedRecord {
                line: line_no,
                reason: format!("empty class label in {:?}", label_field),
            })?;

            if label.contains(':') {
                return Err(SectionBayesError::MalformedRecord {
                    line: line_no,
                    reason: format!("label segment missing, line starts with {:?}", label_field),
                });
            }

            if classes.iter().any(|c| c == label) {
                continue;
            }
            classes.push(label.to_string());

            if !sections.contains(&section) {
                sections.push(section);
            }
        }

        let features = fields
            .map(|token| parse_feature_token(line_no, token))
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Self {
            classes,
            sections,
            features,
        }))
    }
}

fn parse_feature_token<V: CountValue>(line_no: usize, token: &str) -> Result<(FeatureId, V)> {
    let unknown = || SectionBayesError::UnknownFeatureToken {
        line: line_no,
        token: token.to_string(),
    };

    let (id, count) = token.split_once(':').ok_or_else(unknown)?;
    let id: FeatureId = id.parse().map_err(|_| unknown())?;
    let count = V::parse_count(count).ok_or_else(unknown)?;

    Ok((id, count))
}
