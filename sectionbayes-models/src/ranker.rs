use sectionbayes_core::{ClassifierConfig, RankOrder};

use crate::scorer::ClassScores;

/// Sorts scores ascending, most probable class last.
///
/// The sort is stable and the scorer emits classes in label order, so classes
/// with equal scores stay in label order. There is no other tie-break.
pub fn sort_ascending(scores: &mut ClassScores<'_>) {
    scores.sort_by(|a, b| a.1.total_cmp(&b.1));
}

/// Picks the `top_k` most probable classes of a document and renders them as
/// one output line.
///
/// When fewer than `top_k` classes exist the line is padded with
/// `padding_label` at the least probable end, so every line carries exactly
/// `top_k` labels.
#[derive(Debug, Clone)]
pub struct Ranker {
    top_k: usize,
    order: RankOrder,
    padding_label: String,
}

impl Ranker {
    pub fn new(top_k: usize, order: RankOrder, padding_label: impl Into<String>) -> Self {
        Self {
            top_k,
            order,
            padding_label: padding_label.into(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.top_k, config.rank_order, config.padding_label.clone())
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Up to `top_k` classes, most probable first. No padding.
    pub fn top_classes<'a>(&self, mut scores: ClassScores<'a>) -> Vec<&'a str> {
        sort_ascending(&mut scores);
        scores
            .iter()
            .rev()
            .take(self.top_k)
            .map(|&(class, _)| class)
            .collect()
    }

    /// Space-separated line of exactly `top_k` labels in the configured order.
    pub fn format_line(&self, best_first: &[&str]) -> String {
        let mut labels: Vec<&str> = best_first.iter().copied().take(self.top_k).collect();
        while labels.len() < self.top_k {
            labels.push(&self.padding_label);
        }

        if self.order == RankOrder::MostProbableLast {
            labels.reverse();
        }

        labels.join(" ")
    }

    /// Ranks and formats in one step.
    pub fn rank_line(&self, scores: ClassScores<'_>) -> String {
        self.format_line(&self.top_classes(scores))
    }
}
