pub mod collaborative;
pub mod content;
pub mod hybrid;

pub use collaborative::{
    build_item_similarity, predict_rating, top_n_recommendations, ItemSimilarityMatrix,
    RatingMatrix,
};
pub use content::{derive_preferences, matching_factors};
pub use hybrid::HybridRanker;
