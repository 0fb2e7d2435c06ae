use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sectionbayes_core::{
    section_of, ClassLabel, Count, FeatureId, Result, Section, SectionBayesError, TrainingRecord,
};

/// Raw count accumulator for one training corpus.
///
/// Every training document contributes:
/// - `+1` to the document count of each of its classes
/// - `+1` to the document count of each distinct section among its classes
///   (two classes in the same section count once)
/// - its whole feature vector, undivided, to the feature counts of every class
///
/// No smoothing happens here. Counts only ever grow; there is no way to remove a
/// document. All tables are ordered maps so that anything derived from them is
/// reproducible run to run.
///
/// # Invariant
///
/// Every class with a document count also has an entry (possibly empty) in the
/// per-class feature table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCounts {
    feature_counts_by_class: BTreeMap<ClassLabel, BTreeMap<FeatureId, Count>>,
    class_doc_counts: BTreeMap<ClassLabel, u64>,
    section_doc_counts: BTreeMap<Section, u64>,
    documents: u64,
}

impl RawCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one training document.
    ///
    /// `classes` is expected to be free of duplicates and empty labels, which
    /// the vector parser already guarantees. An empty label is still counted as
    /// a class but touches no section.
    ///
    /// # Errors
    ///
    /// - [`SectionBayesError::CountOverflow`] if a feature count would exceed
    ///   [`Count::MAX`]; the counts are left as they were before the call
    pub fn record_document(
        &mut self,
        classes: &[ClassLabel],
        features: &[(FeatureId, Count)],
    ) -> Result<()> {
        let mut document: BTreeMap<FeatureId, Count> = BTreeMap::new();
        for &(feature, count) in features {
            let slot = document.entry(feature).or_insert(0);
            *slot = slot.checked_add(count).ok_or_else(|| overflow(feature))?;
        }

        for class in classes {
            if let Some(existing) = self.feature_counts_by_class.get(class) {
                for (feature, &count) in &document {
                    existing
                        .get(feature)
                        .copied()
                        .unwrap_or(0)
                        .checked_add(count)
                        .ok_or_else(|| overflow(*feature))?;
                }
            }
        }

        let mut sections: Vec<Section> = Vec::with_capacity(classes.len());

        for class in classes {
            *self.class_doc_counts.entry(class.clone()).or_insert(0) += 1;

            let class_features = self
                .feature_counts_by_class
                .entry(class.clone())
                .or_default();

            for (&feature, &count) in &document {
                *class_features.entry(feature).or_insert(0) += count;
            }

            if let Some(section) = section_of(class) {
                if !sections.contains(&section) {
                    sections.push(section);
                }
            }
        }

        for section in sections {
            *self.section_doc_counts.entry(section).or_insert(0) += 1;
        }

        self.documents += 1;
        Ok(())
    }

    /// Adds one parsed training line.
    pub fn record(&mut self, record: &TrainingRecord) -> Result<()> {
        self.record_document(&record.classes, &record.features)
    }

    pub fn feature_counts_by_class(&self) -> &BTreeMap<ClassLabel, BTreeMap<FeatureId, Count>> {
        &self.feature_counts_by_class
    }

    /// Feature counts recorded for `class`, if the class was ever seen.
    pub fn class_features(&self, class: &str) -> Option<&BTreeMap<FeatureId, Count>> {
        self.feature_counts_by_class.get(class)
    }

    pub fn class_doc_counts(&self) -> &BTreeMap<ClassLabel, u64> {
        &self.class_doc_counts
    }

    pub fn section_doc_counts(&self) -> &BTreeMap<Section, u64> {
        &self.section_doc_counts
    }

    /// Number of training documents recorded so far.
    pub fn document_count(&self) -> u64 {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }
}

fn overflow(feature: FeatureId) -> SectionBayesError {
    SectionBayesError::CountOverflow {
        what: format!("feature {feature}"),
    }
}
