use serde::{Deserialize, Serialize};

use crate::models::InteractionKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub interaction: InteractionConfig,
    pub recommendation: RecommendationConfig,
}

/// Declared catalog dimensions. These fix the feature-vector layout, so
/// every item and preference vector built against the same config is
/// comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Number of distinct dishes (cuisine ids run 1..=dish_count).
    pub dish_count: u32,
    /// Number of distinct cuisine families (category ids run 1..=category_count).
    pub category_count: u32,
    /// Hard ceiling on catalog size. The item-item similarity build is
    /// O(items^2 x users); requests over this ceiling are rejected.
    pub max_items: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    pub weights: InteractionWeights,
    /// Continuous exponential decay: interactions lose roughly this
    /// fraction of relative influence per day since the last interaction.
    pub decay_rate_per_day: f32,
}

/// Per-kind base weights for interaction scoring. Carried on the config
/// (never a module-level table) so tests can substitute weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionWeights {
    pub view: f32,
    pub cart_add: f32,
    pub search: f32,
    pub menu_view: f32,
    pub menu_item_cart_add: f32,
}

impl InteractionWeights {
    pub fn base_weight(&self, kind: InteractionKind) -> f32 {
        match kind {
            InteractionKind::View => self.view,
            InteractionKind::CartAdd => self.cart_add,
            InteractionKind::Search => self.search,
            InteractionKind::MenuView => self.menu_view,
            InteractionKind::MenuItemCartAdd => self.menu_item_cart_add,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Weight of the content-based score in the hybrid blend.
    pub content_weight: f32,
    /// Weight of the normalized collaborative score in the hybrid blend.
    pub collaborative_weight: f32,
    /// Minimum number of ratings in the whole system before the
    /// collaborative path participates in the blend.
    pub min_system_ratings: usize,
    /// Neighbours consulted per prediction.
    pub k_neighbors: usize,
    /// Length of the returned ranked list.
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                dish_count: 10,
                category_count: 8,
                max_items: 512,
            },
            interaction: InteractionConfig {
                weights: InteractionWeights {
                    view: 1.0,
                    cart_add: 3.0,
                    search: 2.0,
                    menu_view: 2.5,
                    menu_item_cart_add: 4.0,
                },
                decay_rate_per_day: 0.1,
            },
            recommendation: RecommendationConfig {
                content_weight: 0.6,
                collaborative_weight: 0.4,
                min_system_ratings: 10,
                k_neighbors: 5,
                top_n: 10,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SAVORA"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
