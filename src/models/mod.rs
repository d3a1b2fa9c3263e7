use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A catalog row. Immutable once created; the feature vector is derived on
/// demand rather than stored alongside the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Uuid,
    /// Dish identity, 1-based (1..=dish_count).
    pub cuisine_id: u32,
    /// Cuisine family, 1-based (1..=category_count).
    pub category_id: u32,
    /// Ordinal heat level, 0..=5.
    pub spicy_level: u8,
    pub is_veg: bool,
}

impl MenuItem {
    pub fn new(cuisine_id: u32, category_id: u32, spicy_level: u8, is_veg: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            cuisine_id,
            category_id,
            spicy_level,
            is_veg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionKind {
    View,
    MenuView,
    Search,
    CartAdd,
    MenuItemCartAdd,
}

/// Per-(user, item) interaction counters. Created on first interaction,
/// incremented on repeats, never deleted. `preference_score` is recomputed
/// from the full counter state on every write and refreshed at read time
/// because the decay term depends on "now".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub view_count: u32,
    pub cart_add_count: u32,
    pub search_count: u32,
    pub last_interaction_at: DateTime<Utc>,
    pub preference_score: f32,
}

impl InteractionRecord {
    pub fn new(user_id: Uuid, item_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            item_id,
            view_count: 0,
            cart_add_count: 0,
            search_count: 0,
            last_interaction_at: at,
            preference_score: 0.0,
        }
    }

    /// Bump the counter backing `kind`; the others stay untouched.
    pub fn apply(&mut self, kind: InteractionKind) {
        match kind {
            InteractionKind::View | InteractionKind::MenuView => self.view_count += 1,
            InteractionKind::CartAdd | InteractionKind::MenuItemCartAdd => {
                self.cart_add_count += 1
            }
            InteractionKind::Search => self.search_count += 1,
        }
    }

    pub fn total_count(&self) -> u64 {
        self.view_count as u64 + self.cart_add_count as u64 + self.search_count as u64
    }
}

/// A 1-5 star rating. At most one per (user, item); re-rating overwrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub value: u8,
}

impl Rating {
    pub fn new(user_id: Uuid, item_id: Uuid, value: u8) -> Self {
        Self {
            user_id,
            item_id,
            value,
        }
    }
}

/// Aggregated taste profile for one user, derived from interaction history.
///
/// Unlike an item, a user may prefer several dishes or families at once, so
/// the id sets translate to multiple ones in the one-hot blocks. An absent
/// spice or veg preference leaves the corresponding slots at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TastePreferences {
    pub preferred_dish_ids: BTreeSet<u32>,
    pub preferred_category_ids: BTreeSet<u32>,
    /// Mean spice level over interacted items; rounded to the nearest slot
    /// only when one-hot encoding.
    pub spicy_level: Option<f32>,
    /// Whether the user ever interacted with a vegetarian item. `None`
    /// encodes to the same vector slot value as `Some(false)`.
    pub veg_preference: Option<bool>,
}

impl TastePreferences {
    pub fn is_empty(&self) -> bool {
        self.preferred_dish_ids.is_empty()
            && self.preferred_category_ids.is_empty()
            && self.spicy_level.is_none()
            && self.veg_preference.is_none()
    }
}

/// Which path produced a recommendation (or why none could be produced).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Popular,
    #[serde(rename = "content-based")]
    ContentBased,
    Collaborative,
    Hybrid,
    NoData,
    NoUserRatings,
    NoRecommendations,
    NoPreferences,
}

/// Human-readable diagnostics surfaced next to the score. Derived from the
/// same raw preferences but computed independently; never score inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingFactors {
    pub cuisine_match: bool,
    pub category_match: bool,
    pub spicy_match: bool,
    pub dietary_match: bool,
}

impl MatchingFactors {
    /// All-false factors, used by paths that score without a taste profile.
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub item_id: Uuid,
    /// 0-1-ish for content/hybrid scores, 1-5 for collaborative
    /// predictions, raw interaction count for the popularity fallback.
    pub score: f32,
    pub kind: RecommendationType,
    pub explanation: String,
    pub factors: MatchingFactors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: Uuid,
    pub kind: RecommendationType,
    pub items: Vec<RecommendationItem>,
    pub generated_at: DateTime<Utc>,
}

impl RecommendationResponse {
    pub fn new(user_id: Uuid, kind: RecommendationType, items: Vec<RecommendationItem>) -> Self {
        Self {
            user_id,
            kind,
            items,
            generated_at: Utc::now(),
        }
    }

    /// A valid, explained empty result for the insufficient-data states.
    pub fn empty(user_id: Uuid, kind: RecommendationType) -> Self {
        Self::new(user_id, kind, Vec::new())
    }
}
