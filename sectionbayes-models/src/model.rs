use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sectionbayes_core::{
    section_of, ClassLabel, Count, FeatureId, Float, Result, SectionBayesError, Section, Smoothing,
};
use tracing::{debug, info};

use crate::raw_counts::RawCounts;

/// Read-only log-probability tables derived once from a [`RawCounts`].
///
/// The joint probability of a class is factored as
///
/// ```text
/// P(section) · P(class | section) · P(features | class)
/// ```
///
/// so the class prior stored here is conditional on the class's section, not
/// the global class frequency:
///
/// ```text
/// class_log_prob[c]   = ln(class_docs[c] / section_docs[section(c)])
/// section_log_prob[s] = ln(section_docs[s] / Σ section_docs)
/// ```
///
/// # Smoothing
///
/// A feature seen for class `c` uses add-one smoothing over that class's own
/// vocabulary:
///
/// ```text
/// P(f | c) = (cnt_c[f] + 1) / (mass[c] + vocab[c])
/// ```
///
/// A feature never seen for `c` falls back to one constant shared by every such
/// pair, chosen by [`Smoothing`]:
///
/// - [`Smoothing::MassPlusVocabulary`]: `1 / (total_mass + vocabulary_size)`
/// - [`Smoothing::MassPlusLaplace`]: `1 / (total_mass + 1)`
///
/// Every denominator is clamped to at least 1.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTables {
    class_log_prob: BTreeMap<ClassLabel, Float>,
    section_log_prob: BTreeMap<Section, Float>,
    /// Sum of all feature counts per class.
    total_feature_mass_by_class: BTreeMap<ClassLabel, Count>,
    /// Distinct features observed per class.
    class_vocabulary_size: BTreeMap<ClassLabel, usize>,
    total_feature_mass: Count,
    /// Distinct features observed across all classes.
    vocabulary_size: usize,
    smoothing: Smoothing,
    /// `ln` of the shared probability for a (feature, class) pair never seen in training.
    unseen_log_prob: Float,
}

impl ModelTables {
    /// Derives the tables from the aggregated counts.
    ///
    /// # Errors
    ///
    /// - [`SectionBayesError::EmptyTrainingData`] if no document was recorded
    /// - [`SectionBayesError::CountOverflow`] if a class's feature mass or the
    ///   total feature mass exceeds [`Count::MAX`]
    ///
    /// A class whose section has no document count gets `-inf` as its class
    /// log-probability. [`RawCounts`] cannot produce that state.
    pub fn build(counts: &RawCounts, smoothing: Smoothing) -> Result<Self> {
        if counts.is_empty() {
            return Err(SectionBayesError::EmptyTrainingData);
        }

        info!(
            classes = counts.class_doc_counts().len(),
            sections = counts.section_doc_counts().len(),
            "computing total counts per class and overall"
        );

        let mut total_feature_mass_by_class = BTreeMap::new();
        let mut class_vocabulary_size = BTreeMap::new();
        let mut vocabulary: BTreeSet<FeatureId> = BTreeSet::new();

        for class in counts.class_doc_counts().keys() {
            let features = counts.class_features(class);

            let mass = match features {
                Some(f) => checked_sum(f.values(), || format!("feature mass of class {class}"))?,
                None => 0,
            };
            let distinct = features.map(|f| f.len()).unwrap_or(0);

            if let Some(f) = features {
                vocabulary.extend(f.keys().copied());
            }

            total_feature_mass_by_class.insert(class.clone(), mass);
            class_vocabulary_size.insert(class.clone(), distinct);
        }

        let total_feature_mass = checked_sum(total_feature_mass_by_class.values(), || {
            "total feature mass".to_string()
        })?;
        let vocabulary_size = vocabulary.len();

        info!("computing log probabilities per class and section");

        let section_docs = counts.section_doc_counts();

        let class_log_prob = counts
            .class_doc_counts()
            .iter()
            .map(|(class, &docs)| {
                let in_section = section_of(class)
                    .and_then(|s| section_docs.get(&s).copied())
                    .unwrap_or(0);

                let log_prob = if in_section == 0 {
                    Float::NEG_INFINITY
                } else {
                    (docs as Float / in_section as Float).ln()
                };

                (class.clone(), log_prob)
            })
            .collect();

        let observations: u64 = section_docs.values().sum();
        let section_log_prob = section_docs
            .iter()
            .map(|(&section, &docs)| (section, (docs as Float / observations as Float).ln()))
            .collect();

        let unseen_denominator = match smoothing {
            Smoothing::MassPlusVocabulary => total_feature_mass as Float + vocabulary_size as Float,
            Smoothing::MassPlusLaplace => total_feature_mass as Float + 1.0,
        };
        let unseen_log_prob = -unseen_denominator.max(1.0).ln();

        debug!(
            total_feature_mass,
            vocabulary_size, unseen_log_prob, "model tables built"
        );

        Ok(Self {
            class_log_prob,
            section_log_prob,
            total_feature_mass_by_class,
            class_vocabulary_size,
            total_feature_mass,
            vocabulary_size,
            smoothing,
            unseen_log_prob,
        })
    }

    /// `ln P(class | section(class))`, in class label order.
    pub fn class_log_prob(&self) -> &BTreeMap<ClassLabel, Float> {
        &self.class_log_prob
    }

    /// `ln P(section)`.
    pub fn section_log_prob(&self) -> &BTreeMap<Section, Float> {
        &self.section_log_prob
    }

    pub fn total_feature_mass_by_class(&self) -> &BTreeMap<ClassLabel, Count> {
        &self.total_feature_mass_by_class
    }

    pub fn class_vocabulary_size(&self) -> &BTreeMap<ClassLabel, usize> {
        &self.class_vocabulary_size
    }

    pub fn total_feature_mass(&self) -> Count {
        self.total_feature_mass
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    pub fn unseen_log_prob(&self) -> Float {
        self.unseen_log_prob
    }

    /// Denominator for features seen in `class`: `mass[c] + vocab[c]`, at least 1.
    pub fn seen_denominator(&self, class: &str) -> Float {
        let mass = self.total_feature_mass_by_class.get(class).copied().unwrap_or(0);
        let vocab = self.class_vocabulary_size.get(class).copied().unwrap_or(0);
        (mass as Float + vocab as Float).max(1.0)
    }

    /// `ln P(section(class)) + ln P(class | section)`: the score of a document with no features.
    pub fn prior_log_prob(&self, class: &str) -> Float {
        let class_term = self
            .class_log_prob
            .get(class)
            .copied()
            .unwrap_or(Float::NEG_INFINITY);
        let section_term = section_of(class)
            .and_then(|s| self.section_log_prob.get(&s).copied())
            .unwrap_or(Float::NEG_INFINITY);

        section_term + class_term
    }

    pub fn num_classes(&self) -> usize {
        self.class_log_prob.len()
    }
}

fn checked_sum<'a>(
    mut values: impl Iterator<Item = &'a Count>,
    what: impl FnOnce() -> String,
) -> Result<Count> {
    values
        .try_fold(0 as Count, |acc, &v| acc.checked_add(v))
        .ok_or_else(|| SectionBayesError::CountOverflow { what: what() })
}
