use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{InteractionRecord, MatchingFactors, MenuItem, TastePreferences};

/// How far an item's spice level may sit from the user's average and still
/// count as a spice match.
const SPICY_MATCH_WINDOW: f32 = 1.0;

/// Aggregate a user's interaction history into a single taste profile:
/// the union of dish and family ids they touched, the mean spice level
/// seen, and whether they ever interacted with a vegetarian item.
///
/// Interactions referencing items that are no longer in the catalog
/// contribute nothing; a history made up entirely of such rows yields an
/// empty profile.
pub fn derive_preferences(
    history: &[InteractionRecord],
    catalog: &[MenuItem],
) -> TastePreferences {
    let by_id: HashMap<Uuid, &MenuItem> = catalog.iter().map(|item| (item.id, item)).collect();

    let mut prefs = TastePreferences::default();
    let mut spice_sum = 0.0f32;
    let mut seen = 0u32;
    let mut ever_veg = false;

    for record in history {
        let Some(item) = by_id.get(&record.item_id) else {
            continue;
        };
        prefs.preferred_dish_ids.insert(item.cuisine_id);
        prefs.preferred_category_ids.insert(item.category_id);
        spice_sum += item.spicy_level as f32;
        seen += 1;
        ever_veg |= item.is_veg;
    }

    if seen > 0 {
        prefs.spicy_level = Some(spice_sum / seen as f32);
        prefs.veg_preference = Some(ever_veg);
    }

    prefs
}

/// Per-item explanation flags. Independent diagnostics derived from the
/// same raw preferences as the score, but never fed into it.
pub fn matching_factors(prefs: &TastePreferences, item: &MenuItem) -> MatchingFactors {
    MatchingFactors {
        cuisine_match: prefs.preferred_dish_ids.contains(&item.cuisine_id),
        category_match: prefs.preferred_category_ids.contains(&item.category_id),
        spicy_match: prefs
            .spicy_level
            .is_some_and(|avg| (avg - item.spicy_level as f32).abs() <= SPICY_MATCH_WINDOW),
        dietary_match: prefs
            .veg_preference
            .is_some_and(|veg| veg == item.is_veg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn record_for(item: &MenuItem) -> InteractionRecord {
        let mut record = InteractionRecord::new(Uuid::new_v4(), item.id, Utc::now());
        record.view_count = 1;
        record
    }

    #[test]
    fn test_derive_preferences_unions_ids_and_averages_spice() {
        let items = vec![
            MenuItem::new(1, 1, 2, true),
            MenuItem::new(3, 2, 4, false),
            MenuItem::new(1, 1, 0, false),
        ];
        let history: Vec<InteractionRecord> = items.iter().map(record_for).collect();

        let prefs = derive_preferences(&history, &items);

        assert_eq!(prefs.preferred_dish_ids, BTreeSet::from([1, 3]));
        assert_eq!(prefs.preferred_category_ids, BTreeSet::from([1, 2]));
        assert_eq!(prefs.spicy_level, Some(2.0));
        assert_eq!(prefs.veg_preference, Some(true));
    }

    #[test]
    fn test_veg_preference_false_when_history_is_all_non_veg() {
        let items = vec![MenuItem::new(2, 1, 1, false)];
        let history = vec![record_for(&items[0])];

        let prefs = derive_preferences(&history, &items);
        assert_eq!(prefs.veg_preference, Some(false));
    }

    #[test]
    fn test_unknown_items_yield_empty_profile() {
        let catalog = vec![MenuItem::new(1, 1, 1, true)];
        let stray = InteractionRecord::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());

        let prefs = derive_preferences(&[stray], &catalog);
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_matching_factors() {
        let prefs = TastePreferences {
            preferred_dish_ids: BTreeSet::from([1]),
            preferred_category_ids: BTreeSet::from([2]),
            spicy_level: Some(2.0),
            veg_preference: Some(true),
        };

        let item = MenuItem::new(1, 2, 3, true);
        let factors = matching_factors(&prefs, &item);
        assert!(factors.cuisine_match);
        assert!(factors.category_match);
        assert!(factors.spicy_match); // |2.0 - 3| == 1, inside the window
        assert!(factors.dietary_match);

        let far = MenuItem::new(4, 1, 5, false);
        let factors = matching_factors(&prefs, &far);
        assert!(!factors.cuisine_match);
        assert!(!factors.category_match);
        assert!(!factors.spicy_match);
        assert!(!factors.dietary_match);
    }

    #[test]
    fn test_absent_preferences_never_match() {
        let item = MenuItem::new(1, 1, 0, false);
        let factors = matching_factors(&TastePreferences::default(), &item);
        assert_eq!(factors, MatchingFactors::none());
    }
}
