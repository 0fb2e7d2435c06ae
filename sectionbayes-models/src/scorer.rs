#[cfg(feature = "parallel")]
use rayon::prelude::*;
use sectionbayes_core::{FeatureId, Float, QueryRecord};

use crate::model::ModelTables;
use crate::raw_counts::RawCounts;

/// Per-class final log-scores of one document, in class label order.
pub type ClassScores<'a> = Vec<(&'a str, Float)>;

/// Multinomial log-likelihood scorer over a fitted model.
///
/// For class `c` and a document `{(f, v)}`:
///
/// ```text
/// score(c)      = Σ_f v · ln P(f | c)
/// final(c)      = ln P(section(c)) + ln P(c | section(c)) + score(c)
/// ```
///
/// with `P(f | c)` smoothed as described on [`ModelTables`]. The test-time
/// count `v` may be fractional or zero; it only scales the log term.
///
/// The scorer borrows the counts and tables immutably and holds no other
/// state, so documents can be scored independently (see
/// [`score_documents`](Scorer::score_documents)).
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    counts: &'a RawCounts,
    tables: &'a ModelTables,
}

impl<'a> Scorer<'a> {
    pub fn new(counts: &'a RawCounts, tables: &'a ModelTables) -> Self {
        Self { counts, tables }
    }

    /// `ln P(feature | class)`.
    pub fn feature_log_prob(&self, class: &str, feature: FeatureId) -> Float {
        match self.counts.class_features(class).and_then(|f| f.get(&feature)) {
            Some(&count) => {
                ((count as Float + 1.0) / self.tables.seen_denominator(class)).ln()
            }
            None => self.tables.unseen_log_prob(),
        }
    }

    /// Multinomial log-likelihood `Σ v · ln P(f | class)`, without priors.
    pub fn score_class(&self, class: &str, features: &[(FeatureId, Float)]) -> Float {
        features
            .iter()
            .map(|&(feature, v)| {
                if v == 0.0 {
                    // 0 · ln p is 0 even when p underflows
                    0.0
                } else {
                    v * self.feature_log_prob(class, feature)
                }
            })
            .sum()
    }

    /// Section prior plus class-given-section prior plus likelihood.
    pub fn final_score(&self, class: &str, features: &[(FeatureId, Float)]) -> Float {
        self.tables.prior_log_prob(class) + self.score_class(class, features)
    }

    /// Final scores of every known class for one document.
    pub fn score_document(&self, features: &[(FeatureId, Float)]) -> ClassScores<'a> {
        self.tables
            .class_log_prob()
            .keys()
            .map(|class| (class.as_str(), self.final_score(class, features)))
            .collect()
    }

    /// Scores a slice of documents, preserving input order.
    ///
    /// With the `parallel` feature the documents are scored on the rayon pool.
    pub fn score_documents(&self, documents: &[QueryRecord]) -> Vec<ClassScores<'a>> {
        #[cfg(feature = "parallel")]
        let documents = documents.par_iter();
        #[cfg(not(feature = "parallel"))]
        let documents = documents.iter();

        documents
            .map(|doc| self.score_document(&doc.features))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectionbayes_core::{Smoothing, TrainingRecord};

    fn fit(lines: &[&str], smoothing: Smoothing) -> (RawCounts, ModelTables) {
        let mut counts = RawCounts::new();
        for (i, line) in lines.iter().enumerate() {
            let record = TrainingRecord::parse(i + 1, line).unwrap().unwrap();
            counts.record(&record).unwrap();
        }
        let tables = ModelTables::build(&counts, smoothing).unwrap();
        (counts, tables)
    }

    #[test]
    fn test_seen_feature_log_prob() {
        // a1: feature 1 seen 3 times, mass 4, class vocabulary 2.
        let (counts, tables) = fit(&["a1 1:3 2:1", "a2 1:1 2:2"], Smoothing::default());
        let scorer = Scorer::new(&counts, &tables);

        let expected = ((3.0_f64 + 1.0) / (4.0 + 2.0)).ln();
        let got = scorer.score_class("a1", &[(1, 1.0)]);
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn test_seen_feature_uses_class_vocabulary() {
        // a1 only ever saw feature 1, while the global vocabulary has 3 features.
        let (counts, tables) = fit(&["a1 1:5", "b1 2:1 3:1"], Smoothing::default());
        let scorer = Scorer::new(&counts, &tables);

        let expected = ((5.0_f64 + 1.0) / (5.0 + 1.0)).ln();
        assert!((scorer.feature_log_prob("a1", 1) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_feature_fallback() {
        let (counts, tables) = fit(&["a1 1:3 2:1", "a2 1:1 2:2"], Smoothing::default());
        let scorer = Scorer::new(&counts, &tables);

        // total mass 7, vocabulary 2
        let expected = (1.0_f64 / 9.0).ln();
        assert!((scorer.feature_log_prob("a1", 42) - expected).abs() < 1e-12);
        assert!((scorer.feature_log_prob("a2", 42) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_feature_fallback_laplace() {
        let (counts, tables) = fit(&["a1 1:3 2:1", "a2 1:1 2:2"], Smoothing::MassPlusLaplace);
        let scorer = Scorer::new(&counts, &tables);

        let expected = (1.0_f64 / 8.0).ln();
        assert!((scorer.feature_log_prob("a1", 42) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_count_scales_log_term() {
        let (counts, tables) = fit(&["a1 1:3 2:1", "a2 1:1 2:2"], Smoothing::default());
        let scorer = Scorer::new(&counts, &tables);

        let once = scorer.score_class("a1", &[(1, 1.0)]);
        let twice = scorer.score_class("a1", &[(1, 2.0)]);
        let half = scorer.score_class("a1", &[(1, 0.5)]);

        assert!((twice - 2.0 * once).abs() < 1e-12);
        assert!((half - 0.5 * once).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_scores_priors_only() {
        let (counts, tables) = fit(
            &["a1 1:3 2:1", "a2 1:1 2:2", "b1 3:3", "a1,b2 4:1"],
            Smoothing::default(),
        );
        let scorer = Scorer::new(&counts, &tables);

        let zeros = [(1, 0.0), (3, 0.0), (99, 0.0)];
        for (class, score) in scorer.score_document(&zeros) {
            let section = class.chars().next().unwrap();
            let expected = tables.section_log_prob()[&section] + tables.class_log_prob()[class];
            assert!((score - expected).abs() < 1e-12, "class {class}");
        }
    }

    #[test]
    fn test_final_score_combines_terms() {
        let (counts, tables) = fit(&["a1 1:3 2:1", "a2 1:1 2:2", "b1 2:2"], Smoothing::default());
        let scorer = Scorer::new(&counts, &tables);
        let doc = [(1, 2.0), (2, 1.0)];

        let expected = tables.section_log_prob()[&'a']
            + tables.class_log_prob()["a2"]
            + 2.0 * scorer.feature_log_prob("a2", 1)
            + scorer.feature_log_prob("a2", 2);
        assert!((scorer.final_score("a2", &doc) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_featureless_class_scores_finite() {
        let (counts, tables) = fit(&["z1", "a1 1:2"], Smoothing::default());
        let scorer = Scorer::new(&counts, &tables);

        let score = scorer.final_score("z1", &[(1, 1.0)]);
        assert!(score.is_finite());
    }

    #[test]
    fn test_score_document_covers_all_classes_in_order() {
        let (counts, tables) = fit(&["b1 1:1", "a2 1:1", "a1 2:1"], Smoothing::default());
        let scorer = Scorer::new(&counts, &tables);

        let labels: Vec<&str> = scorer
            .score_document(&[(1, 1.0)])
            .into_iter()
            .map(|(c, _)| c)
            .collect();
        assert_eq!(labels, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn test_score_documents_matches_single() {
        let (counts, tables) = fit(&["a1 1:3 2:1", "a2 1:1 2:2", "b1 3:1"], Smoothing::default());
        let scorer = Scorer::new(&counts, &tables);

        let docs: Vec<QueryRecord> = ["x 1:1", "x 2:3 3:1", "x"]
            .iter()
            .map(|l| QueryRecord::parse(1, l).unwrap().unwrap())
            .collect();

        let batch = scorer.score_documents(&docs);
        assert_eq!(batch.len(), 3);
        for (doc, scores) in docs.iter().zip(batch) {
            assert_eq!(scores, scorer.score_document(&doc.features));
        }
    }
}
