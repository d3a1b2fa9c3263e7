use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::Rating;
use crate::utils::cosine_similarity;

/// Sparse user x item rating table, built fresh from all rating rows per
/// request. Rows upsert: a later row for the same (user, item) overwrites
/// the earlier one. The item-side index keeps raters in sorted order so
/// similarity builds over unchanged data are bit-identical.
#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    by_user: HashMap<Uuid, HashMap<Uuid, f32>>,
    by_item: HashMap<Uuid, BTreeMap<Uuid, f32>>,
}

impl RatingMatrix {
    pub fn from_rows(rows: &[Rating]) -> Self {
        let mut matrix = Self::default();
        for row in rows {
            matrix
                .by_user
                .entry(row.user_id)
                .or_default()
                .insert(row.item_id, row.value as f32);
            matrix
                .by_item
                .entry(row.item_id)
                .or_default()
                .insert(row.user_id, row.value as f32);
        }
        matrix
    }

    pub fn rating(&self, user_id: Uuid, item_id: Uuid) -> Option<f32> {
        self.by_user.get(&user_id)?.get(&item_id).copied()
    }

    pub fn user_ratings(&self, user_id: Uuid) -> Option<&HashMap<Uuid, f32>> {
        self.by_user.get(&user_id)
    }

    pub fn user_has_ratings(&self, user_id: Uuid) -> bool {
        self.by_user.get(&user_id).is_some_and(|r| !r.is_empty())
    }

    /// Every item id appearing in any user's ratings, sorted.
    pub fn item_universe(&self) -> Vec<Uuid> {
        let mut items: Vec<Uuid> = self.by_item.keys().copied().collect();
        items.sort_unstable();
        items
    }

    /// Distinct (user, item) entries after upserts.
    pub fn total_ratings(&self) -> usize {
        self.by_user.values().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }

    fn raters(&self, item_id: Uuid) -> Option<&BTreeMap<Uuid, f32>> {
        self.by_item.get(&item_id)
    }
}

/// Symmetric sparse item x item similarity matrix. No (i, i) entry is ever
/// stored, and a missing entry means "no co-rated users, similarity
/// undefined", deliberately distinct from an explicit 0.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemSimilarityMatrix {
    entries: HashMap<Uuid, HashMap<Uuid, f32>>,
}

impl ItemSimilarityMatrix {
    pub fn similarity(&self, a: Uuid, b: Uuid) -> Option<f32> {
        self.entries.get(&a)?.get(&b).copied()
    }

    pub fn neighbours(&self, item_id: Uuid) -> Option<&HashMap<Uuid, f32>> {
        self.entries.get(&item_id)
    }

    pub fn has_entries(&self, item_id: Uuid) -> bool {
        self.entries.get(&item_id).is_some_and(|n| !n.is_empty())
    }

    pub fn item_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_symmetric(&mut self, a: Uuid, b: Uuid, value: f32) {
        self.entries.entry(a).or_default().insert(b, value);
        self.entries.entry(b).or_default().insert(a, value);
    }
}

/// Derive the item-item similarity matrix from rating co-occurrence.
///
/// For every unordered item pair, the ratings of users who rated both
/// items form two parallel vectors (same sorted user order on both sides)
/// compared by cosine. Pairs with no co-raters get no entry. The pair loop
/// is O(items^2 x users), so callers bound the catalog size before
/// invoking this. Work is partitioned by unordered pair across rayon
/// workers so each symmetric entry is written exactly once.
pub fn build_item_similarity(ratings: &RatingMatrix) -> Result<ItemSimilarityMatrix, EngineError> {
    let items = ratings.item_universe();

    let mut pairs = Vec::with_capacity(items.len().saturating_mul(items.len().saturating_sub(1)) / 2);
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            pairs.push((items[i], items[j]));
        }
    }

    let scored = pairs
        .par_iter()
        .map(|&(a, b)| -> Result<Option<(Uuid, Uuid, f32)>, EngineError> {
            Ok(pair_similarity(ratings, a, b)?.map(|sim| (a, b, sim)))
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    let mut matrix = ItemSimilarityMatrix::default();
    for (a, b, sim) in scored.into_iter().flatten() {
        matrix.insert_symmetric(a, b, sim);
    }

    Ok(matrix)
}

fn pair_similarity(
    ratings: &RatingMatrix,
    a: Uuid,
    b: Uuid,
) -> Result<Option<f32>, EngineError> {
    let (Some(raters_a), Some(raters_b)) = (ratings.raters(a), ratings.raters(b)) else {
        return Ok(None);
    };

    let mut vec_a = Vec::new();
    let mut vec_b = Vec::new();
    for (user_id, &rating_a) in raters_a {
        if let Some(&rating_b) = raters_b.get(user_id) {
            vec_a.push(rating_a);
            vec_b.push(rating_b);
        }
    }

    if vec_a.is_empty() {
        return Ok(None);
    }

    cosine_similarity(&vec_a, &vec_b).map(Some)
}

/// Predict the rating `user_id` would give `item_id` via k-nearest-neighbour
/// weighted averaging over the user's rated items. `None` means
/// "insufficient data", which is a state, not an error.
pub fn predict_rating(
    user_id: Uuid,
    item_id: Uuid,
    ratings: &RatingMatrix,
    similarities: &ItemSimilarityMatrix,
    k: usize,
) -> Option<f32> {
    // An already-rated item "predicts" as the stored rating verbatim.
    if let Some(rating) = ratings.rating(user_id, item_id) {
        return Some(rating);
    }

    let user_ratings = ratings.user_ratings(user_id).filter(|r| !r.is_empty())?;
    if !similarities.has_entries(item_id) {
        return None;
    }

    let mut candidates: Vec<(Uuid, f32, f32)> = user_ratings
        .iter()
        .filter_map(|(&rated_item, &rating)| {
            similarities
                .similarity(item_id, rated_item)
                .filter(|&sim| sim > 0.0)
                .map(|sim| (rated_item, sim, rating))
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    candidates.truncate(k);

    let similarity_sum: f32 = candidates.iter().map(|(_, sim, _)| sim).sum();
    if similarity_sum == 0.0 {
        // Unreachable given the > 0 filter, but guard the division anyway.
        return None;
    }

    let weighted: f32 = candidates.iter().map(|(_, sim, rating)| sim * rating).sum();
    Some(weighted / similarity_sum)
}

/// Rank the items the user has not rated yet by predicted rating.
/// Unpredictable items and non-positive predictions are dropped.
pub fn top_n_recommendations(
    user_id: Uuid,
    ratings: &RatingMatrix,
    similarities: &ItemSimilarityMatrix,
    all_item_ids: &[Uuid],
    n: usize,
    k: usize,
) -> Vec<(Uuid, f32)> {
    let mut predictions: Vec<(Uuid, f32)> = all_item_ids
        .iter()
        .filter(|&&item_id| ratings.rating(user_id, item_id).is_none())
        .filter_map(|&item_id| {
            predict_rating(user_id, item_id, ratings, similarities, k)
                .filter(|&p| p > 0.0)
                .map(|p| (item_id, p))
        })
        .collect();

    predictions.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    predictions.truncate(n);
    predictions
}
