use anyhow::{anyhow, Result};

use crate::features::MAX_SPICY_LEVEL;
use crate::models::{InteractionRecord, MenuItem, Rating};

/// Boundary checks on rows handed over by the CRUD layer. Structural
/// problems are rejected here; catalog-bound checks on cuisine/category
/// ids belong to the vectorizer, which owns the declared dimensions.
pub fn validate_menu_item(item: &MenuItem) -> Result<()> {
    if item.id.is_nil() {
        return Err(anyhow!("Menu item ID cannot be nil"));
    }

    if item.cuisine_id == 0 {
        return Err(anyhow!("Cuisine ID is 1-based and cannot be 0"));
    }

    if item.category_id == 0 {
        return Err(anyhow!("Category ID is 1-based and cannot be 0"));
    }

    if item.spicy_level > MAX_SPICY_LEVEL {
        return Err(anyhow!(
            "Spicy level {} out of range (max {})",
            item.spicy_level,
            MAX_SPICY_LEVEL
        ));
    }

    Ok(())
}

pub fn validate_rating(rating: &Rating) -> Result<()> {
    if rating.user_id.is_nil() {
        return Err(anyhow!("User ID cannot be nil"));
    }

    if rating.item_id.is_nil() {
        return Err(anyhow!("Item ID cannot be nil"));
    }

    if !(1..=5).contains(&rating.value) {
        return Err(anyhow!("Rating must be between 1 and 5, got {}", rating.value));
    }

    Ok(())
}

pub fn validate_interaction_record(record: &InteractionRecord) -> Result<()> {
    if record.user_id.is_nil() {
        return Err(anyhow!("User ID cannot be nil"));
    }

    if record.item_id.is_nil() {
        return Err(anyhow!("Item ID cannot be nil"));
    }

    // Validate timestamp is not too far in the future
    let now = chrono::Utc::now();
    let max_future = now + chrono::Duration::hours(1);
    if record.last_interaction_at > max_future {
        return Err(anyhow!(
            "Timestamp cannot be more than 1 hour in the future"
        ));
    }

    if !record.preference_score.is_finite() {
        return Err(anyhow!(
            "Preference score contains invalid values (NaN or Infinity)"
        ));
    }

    Ok(())
}
