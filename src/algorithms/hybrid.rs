use std::collections::HashMap;
use uuid::Uuid;

use crate::algorithms::collaborative::{
    build_item_similarity, predict_rating, top_n_recommendations, RatingMatrix,
};
use crate::algorithms::content::{derive_preferences, matching_factors};
use crate::config::Config;
use crate::error::EngineError;
use crate::features::Vectorizer;
use crate::models::{
    InteractionRecord, MatchingFactors, MenuItem, Rating, RecommendationItem,
    RecommendationResponse, RecommendationType,
};
use crate::utils::cosine_similarity;

/// Blends content-based and collaborative scores into one ranked list,
/// falling back through popularity and explained empty states when the
/// data is too thin to personalize. Stateless: every call rebuilds its
/// matrices from the rows it is handed.
#[derive(Debug, Clone)]
pub struct HybridRanker {
    vectorizer: Vectorizer,
    content_weight: f32,
    collaborative_weight: f32,
    min_system_ratings: usize,
    k_neighbors: usize,
    top_n: usize,
}

impl HybridRanker {
    pub fn new(config: &Config) -> Self {
        Self {
            vectorizer: Vectorizer::new(&config.catalog),
            content_weight: config.recommendation.content_weight,
            collaborative_weight: config.recommendation.collaborative_weight,
            min_system_ratings: config.recommendation.min_system_ratings,
            k_neighbors: config.recommendation.k_neighbors,
            top_n: config.recommendation.top_n,
        }
    }

    /// Produce the ranked list for one user. States, evaluated in order:
    /// no interaction history -> globally popular items; history but zero
    /// ratings system-wide -> empty `no_data`; no derivable taste profile
    /// -> empty `no_preferences`; enough ratings and the user has some ->
    /// hybrid blend; otherwise pure content-based.
    pub fn rank(
        &self,
        user_id: Uuid,
        catalog: &[MenuItem],
        interactions: &[InteractionRecord],
        ratings: &[Rating],
    ) -> Result<RecommendationResponse, EngineError> {
        let history: Vec<InteractionRecord> = interactions
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();

        if history.is_empty() {
            return Ok(self.popular(user_id, catalog, interactions));
        }

        if ratings.is_empty() {
            return Ok(RecommendationResponse::empty(
                user_id,
                RecommendationType::NoData,
            ));
        }

        let prefs = derive_preferences(&history, catalog);
        if prefs.is_empty() {
            return Ok(RecommendationResponse::empty(
                user_id,
                RecommendationType::NoPreferences,
            ));
        }
        let preference_vector = self.vectorizer.preference_vector(&prefs)?;

        let matrix = RatingMatrix::from_rows(ratings);
        let blend_collaborative = matrix.total_ratings() >= self.min_system_ratings
            && matrix.user_has_ratings(user_id);
        let similarities = if blend_collaborative {
            Some(build_item_similarity(&matrix)?)
        } else {
            None
        };

        let kind = if blend_collaborative {
            RecommendationType::Hybrid
        } else {
            RecommendationType::ContentBased
        };

        let mut items = Vec::with_capacity(catalog.len());
        for item in catalog {
            let item_vector = self.vectorizer.item_vector(item)?;
            let content_score = cosine_similarity(&preference_vector, &item_vector)?;
            let factors = matching_factors(&prefs, item);

            let (score, explanation) = match &similarities {
                Some(similarities) => {
                    match predict_rating(user_id, item.id, &matrix, similarities, self.k_neighbors)
                    {
                        Some(predicted) => {
                            let normalized = (predicted - 1.0) / 4.0;
                            let blended = self.content_weight * content_score
                                + self.collaborative_weight * normalized;
                            (
                                blended,
                                format!(
                                    "Matches your taste ({:.2}) and similar diners rated it {:.1}/5",
                                    content_score, predicted
                                ),
                            )
                        }
                        // No usable prediction: the content score stands
                        // alone rather than being blended with a zero.
                        None => (
                            content_score,
                            format!("Matches your taste profile (similarity {:.2})", content_score),
                        ),
                    }
                }
                None => (
                    content_score,
                    format!("Matches your taste profile (similarity {:.2})", content_score),
                ),
            };

            items.push(RecommendationItem {
                item_id: item.id,
                score,
                kind,
                explanation,
                factors,
            });
        }

        sort_ranked(&mut items);
        items.truncate(self.top_n);

        Ok(RecommendationResponse::new(user_id, kind, items))
    }

    /// Collaborative-only entry point: predictions on the 1-5 scale for
    /// items the user has not rated, or an explained empty state.
    pub fn recommend_collaborative(
        &self,
        user_id: Uuid,
        catalog: &[MenuItem],
        ratings: &[Rating],
    ) -> Result<RecommendationResponse, EngineError> {
        let matrix = RatingMatrix::from_rows(ratings);
        if matrix.is_empty() {
            return Ok(RecommendationResponse::empty(
                user_id,
                RecommendationType::NoData,
            ));
        }
        if !matrix.user_has_ratings(user_id) {
            return Ok(RecommendationResponse::empty(
                user_id,
                RecommendationType::NoUserRatings,
            ));
        }

        let similarities = build_item_similarity(&matrix)?;
        let item_ids: Vec<Uuid> = catalog.iter().map(|item| item.id).collect();
        let predictions = top_n_recommendations(
            user_id,
            &matrix,
            &similarities,
            &item_ids,
            self.top_n,
            self.k_neighbors,
        );

        if predictions.is_empty() {
            return Ok(RecommendationResponse::empty(
                user_id,
                RecommendationType::NoRecommendations,
            ));
        }

        let items = predictions
            .into_iter()
            .map(|(item_id, predicted)| RecommendationItem {
                item_id,
                score: predicted,
                kind: RecommendationType::Collaborative,
                explanation: format!("Diners with similar ratings scored this {:.1}/5", predicted),
                factors: MatchingFactors::none(),
            })
            .collect();

        Ok(RecommendationResponse::new(
            user_id,
            RecommendationType::Collaborative,
            items,
        ))
    }

    /// Cold-start fallback: catalog items ranked by total interaction
    /// count across all users. Matching factors are zeroed and the raw
    /// count doubles as the score.
    fn popular(
        &self,
        user_id: Uuid,
        catalog: &[MenuItem],
        interactions: &[InteractionRecord],
    ) -> RecommendationResponse {
        let mut totals: HashMap<Uuid, u64> = HashMap::new();
        for record in interactions {
            *totals.entry(record.item_id).or_insert(0) += record.total_count();
        }

        let mut ranked: Vec<(Uuid, u64)> = catalog
            .iter()
            .filter_map(|item| totals.get(&item.id).map(|&count| (item.id, count)))
            .filter(|&(_, count)| count > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.top_n);

        let items = ranked
            .into_iter()
            .map(|(item_id, count)| RecommendationItem {
                item_id,
                score: count as f32,
                kind: RecommendationType::Popular,
                explanation: format!("Popular with other diners ({} interactions)", count),
                factors: MatchingFactors::none(),
            })
            .collect();

        RecommendationResponse::new(user_id, RecommendationType::Popular, items)
    }
}

fn sort_ranked(items: &mut [RecommendationItem]) {
    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
}
