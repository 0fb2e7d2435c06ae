use sectionbayes_core::{ClassLabel, Float};

/// Hit rates of the emitted rankings against the labels carried by the test
/// documents themselves.
///
/// - top-1 hit: the most probable class is one of the document's labels
/// - top-k hit: at least one of the document's labels is among the emitted classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopKAccuracy {
    documents: usize,
    top1_hits: usize,
    topk_hits: usize,
}

impl TopKAccuracy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one document. `best_first` is the ranking without padding.
    pub fn observe(&mut self, gold: &[ClassLabel], best_first: &[&str]) {
        self.documents += 1;

        if best_first
            .first()
            .is_some_and(|top| gold.iter().any(|g| g == top))
        {
            self.top1_hits += 1;
        }

        if best_first.iter().any(|c| gold.iter().any(|g| g == c)) {
            self.topk_hits += 1;
        }
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn top1_hits(&self) -> usize {
        self.top1_hits
    }

    pub fn topk_hits(&self) -> usize {
        self.topk_hits
    }

    /// Fraction of documents with a top-1 hit; `0.0` when nothing was observed.
    pub fn top1(&self) -> Float {
        ratio(self.top1_hits, self.documents)
    }

    /// Fraction of documents with a top-k hit; `0.0` when nothing was observed.
    pub fn topk(&self) -> Float {
        ratio(self.topk_hits, self.documents)
    }
}

fn ratio(hits: usize, total: usize) -> Float {
    if total == 0 {
        return 0.0;
    }
    hits as Float / total as Float
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold(labels: &[&str]) -> Vec<ClassLabel> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_empty_accuracy() {
        let acc = TopKAccuracy::new();
        assert_eq!(acc.top1(), 0.0);
        assert_eq!(acc.topk(), 0.0);
    }

    #[test]
    fn test_hits() {
        let mut acc = TopKAccuracy::new();
        acc.observe(&gold(&["a1"]), &["a1", "a2", "b1"]);
        acc.observe(&gold(&["b1"]), &["a1", "a2", "b1"]);
        acc.observe(&gold(&["c4"]), &["a1", "a2", "b1"]);
        acc.observe(&gold(&["c4", "a2"]), &["a2", "c4"]);

        assert_eq!(acc.documents(), 4);
        assert_eq!(acc.top1_hits(), 2);
        assert_eq!(acc.topk_hits(), 3);
        assert!((acc.top1() - 0.5).abs() < 1e-12);
        assert!((acc.topk() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_no_ranking() {
        let mut acc = TopKAccuracy::new();
        acc.observe(&gold(&["a1"]), &[]);
        assert_eq!(acc.top1_hits(), 0);
        assert_eq!(acc.topk_hits(), 0);
    }
}
