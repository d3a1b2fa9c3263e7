use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::RecommendationItem;

/// Offline ranking-quality summary for one recommendation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingMetrics {
    pub precision_at_k: f64,
    pub recall_at_k: f64,
    pub f1_score: f64,
    pub ndcg_at_k: f64,
}

/// Evaluates ranked output against a relevance judgment, considering only
/// the first `k` positions.
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    k: usize,
}

impl MetricsCalculator {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn precision_at_k(&self, ranked: &[RecommendationItem], relevant: &HashSet<Uuid>) -> f64 {
        if ranked.is_empty() {
            return 0.0;
        }

        let hits = ranked
            .iter()
            .take(self.k)
            .filter(|item| relevant.contains(&item.item_id))
            .count();

        hits as f64 / self.k.min(ranked.len()) as f64
    }

    pub fn recall_at_k(&self, ranked: &[RecommendationItem], relevant: &HashSet<Uuid>) -> f64 {
        if relevant.is_empty() {
            return 0.0;
        }

        let hits = ranked
            .iter()
            .take(self.k)
            .filter(|item| relevant.contains(&item.item_id))
            .count();

        hits as f64 / relevant.len() as f64
    }

    pub fn f1_score(&self, precision: f64, recall: f64) -> f64 {
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    pub fn ndcg_at_k(&self, ranked: &[RecommendationItem], gains: &HashMap<Uuid, f64>) -> f64 {
        let dcg: f64 = ranked
            .iter()
            .take(self.k)
            .enumerate()
            .map(|(i, item)| {
                let gain = gains.get(&item.item_id).unwrap_or(&0.0);
                gain / ((i + 2) as f64).log2()
            })
            .sum();

        let mut ideal: Vec<f64> = gains.values().copied().collect();
        ideal.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let idcg: f64 = ideal
            .iter()
            .take(self.k)
            .enumerate()
            .map(|(i, gain)| gain / ((i + 2) as f64).log2())
            .sum();

        if idcg == 0.0 {
            0.0
        } else {
            dcg / idcg
        }
    }

    pub fn summarize(
        &self,
        ranked: &[RecommendationItem],
        relevant: &HashSet<Uuid>,
        gains: &HashMap<Uuid, f64>,
    ) -> RankingMetrics {
        let precision = self.precision_at_k(ranked, relevant);
        let recall = self.recall_at_k(ranked, relevant);

        RankingMetrics {
            precision_at_k: precision,
            recall_at_k: recall,
            f1_score: self.f1_score(precision, recall),
            ndcg_at_k: self.ndcg_at_k(ranked, gains),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchingFactors, RecommendationType};

    fn ranked_item(item_id: Uuid, score: f32) -> RecommendationItem {
        RecommendationItem {
            item_id,
            score,
            kind: RecommendationType::ContentBased,
            explanation: String::new(),
            factors: MatchingFactors::none(),
        }
    }

    #[test]
    fn test_precision_and_recall() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let ranked: Vec<RecommendationItem> = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| ranked_item(id, 1.0 - i as f32 * 0.1))
            .collect();
        let relevant = HashSet::from([ids[0], ids[2]]);

        let calculator = MetricsCalculator::new(3);
        let precision = calculator.precision_at_k(&ranked, &relevant);
        let recall = calculator.recall_at_k(&ranked, &relevant);

        assert!((precision - 2.0 / 3.0).abs() < 1e-9);
        assert!((recall - 1.0).abs() < 1e-9);

        let f1 = calculator.f1_score(precision, recall);
        assert!((f1 - 2.0 * precision * recall / (precision + recall)).abs() < 1e-9);
    }

    #[test]
    fn test_ndcg_prefers_relevant_items_first() {
        let good = Uuid::new_v4();
        let bad = Uuid::new_v4();
        let gains = HashMap::from([(good, 1.0), (bad, 0.0)]);

        let calculator = MetricsCalculator::new(2);
        let well_ordered = vec![ranked_item(good, 0.9), ranked_item(bad, 0.1)];
        let badly_ordered = vec![ranked_item(bad, 0.9), ranked_item(good, 0.1)];

        let high = calculator.ndcg_at_k(&well_ordered, &gains);
        let low = calculator.ndcg_at_k(&badly_ordered, &gains);

        assert!((high - 1.0).abs() < 1e-9);
        assert!(low < high);
        assert!(low > 0.0);
    }

    #[test]
    fn test_empty_judgments() {
        let calculator = MetricsCalculator::new(5);
        let ranked = vec![ranked_item(Uuid::new_v4(), 0.5)];

        assert_eq!(calculator.recall_at_k(&ranked, &HashSet::new()), 0.0);
        assert_eq!(calculator.ndcg_at_k(&ranked, &HashMap::new()), 0.0);
    }
}
