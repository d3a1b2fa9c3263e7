use crate::config::CatalogConfig;
use crate::error::EngineError;
use crate::models::{MenuItem, TastePreferences};

/// Number of spice slots (ordinal levels 0..=5).
pub const SPICE_LEVELS: usize = 6;
pub const MAX_SPICY_LEVEL: u8 = 5;

/// Encodes items and taste profiles into fixed-length comparable vectors.
///
/// Layout: `[dish one-hot | category one-hot | spice one-hot | veg scalar]`.
/// The length is fixed by the declared catalog dimensions, so every vector
/// built by the same `Vectorizer` is comparable. Encoding is pure and
/// deterministic; out-of-range ids are rejected before any slot is written.
#[derive(Debug, Clone)]
pub struct Vectorizer {
    dish_count: usize,
    category_count: usize,
}

impl Vectorizer {
    pub fn new(catalog: &CatalogConfig) -> Self {
        Self {
            dish_count: catalog.dish_count as usize,
            category_count: catalog.category_count as usize,
        }
    }

    pub fn vector_len(&self) -> usize {
        self.dish_count + self.category_count + SPICE_LEVELS + 1
    }

    /// Exactly one `1` per one-hot block, veg flag in the last slot.
    pub fn item_vector(&self, item: &MenuItem) -> Result<Vec<f32>, EngineError> {
        let mut vector = vec![0.0; self.vector_len()];

        vector[self.dish_slot(item.cuisine_id)?] = 1.0;
        vector[self.category_slot(item.category_id)?] = 1.0;
        vector[self.spice_slot(item.spicy_level)?] = 1.0;
        if item.is_veg {
            vector[self.veg_slot()] = 1.0;
        }

        Ok(vector)
    }

    /// Preference vectors may set several dish/category slots, and an
    /// all-zero block where no preference was recorded. An absent veg
    /// preference encodes as 0.0, the same as an explicit non-veg
    /// preference (the distinction is not representable in the vector).
    pub fn preference_vector(&self, prefs: &TastePreferences) -> Result<Vec<f32>, EngineError> {
        let mut vector = vec![0.0; self.vector_len()];

        for &dish_id in &prefs.preferred_dish_ids {
            vector[self.dish_slot(dish_id)?] = 1.0;
        }
        for &category_id in &prefs.preferred_category_ids {
            vector[self.category_slot(category_id)?] = 1.0;
        }
        if let Some(level) = prefs.spicy_level {
            // Float-to-int casts saturate, so an absurd average still lands
            // in spice_slot's range check instead of wrapping.
            let rounded = level.round().max(0.0) as u8;
            vector[self.spice_slot(rounded)?] = 1.0;
        }
        if prefs.veg_preference.unwrap_or(false) {
            vector[self.veg_slot()] = 1.0;
        }

        Ok(vector)
    }

    // External ids are 1-based; slots are 0-based.
    fn dish_slot(&self, cuisine_id: u32) -> Result<usize, EngineError> {
        if cuisine_id == 0 || cuisine_id as usize > self.dish_count {
            return Err(EngineError::InvalidAttribute {
                attribute: "cuisine_id",
                value: cuisine_id,
                max: self.dish_count as u32,
            });
        }
        Ok(cuisine_id as usize - 1)
    }

    fn category_slot(&self, category_id: u32) -> Result<usize, EngineError> {
        if category_id == 0 || category_id as usize > self.category_count {
            return Err(EngineError::InvalidAttribute {
                attribute: "category_id",
                value: category_id,
                max: self.category_count as u32,
            });
        }
        Ok(self.dish_count + category_id as usize - 1)
    }

    fn spice_slot(&self, level: u8) -> Result<usize, EngineError> {
        if level > MAX_SPICY_LEVEL {
            return Err(EngineError::InvalidAttribute {
                attribute: "spicy_level",
                value: level as u32,
                max: MAX_SPICY_LEVEL as u32,
            });
        }
        Ok(self.dish_count + self.category_count + level as usize)
    }

    fn veg_slot(&self) -> usize {
        self.vector_len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::BTreeSet;

    fn vectorizer() -> Vectorizer {
        Vectorizer::new(&Config::default().catalog)
    }

    #[test]
    fn test_item_vector_layout() {
        let v = vectorizer();
        let item = MenuItem::new(1, 2, 3, true);
        let vector = v.item_vector(&item).unwrap();

        assert_eq!(vector.len(), v.vector_len());
        assert_eq!(vector[0], 1.0); // dish 1 -> slot 0
        assert_eq!(vector[10 + 1], 1.0); // category 2 -> second category slot
        assert_eq!(vector[10 + 8 + 3], 1.0); // spice level 3
        assert_eq!(vector[vector.len() - 1], 1.0); // veg flag

        let ones = vector.iter().filter(|&&x| x == 1.0).count();
        assert_eq!(ones, 4);
    }

    #[test]
    fn test_vectorization_is_deterministic() {
        let v = vectorizer();
        let item = MenuItem::new(4, 3, 2, false);
        assert_eq!(v.item_vector(&item).unwrap(), v.item_vector(&item).unwrap());
    }

    #[test]
    fn test_veg_flag_differs_in_last_slot_only() {
        let v = vectorizer();
        let veg = MenuItem::new(5, 1, 0, true);
        let non_veg = MenuItem {
            is_veg: false,
            ..veg.clone()
        };

        let a = v.item_vector(&veg).unwrap();
        let b = v.item_vector(&non_veg).unwrap();

        assert_eq!(a[..a.len() - 1], b[..b.len() - 1]);
        assert_eq!(a[a.len() - 1], 1.0);
        assert_eq!(b[b.len() - 1], 0.0);
    }

    #[test]
    fn test_out_of_range_ids_are_rejected() {
        let v = vectorizer();

        let bad_dish = MenuItem::new(11, 1, 0, false);
        assert!(matches!(
            v.item_vector(&bad_dish),
            Err(EngineError::InvalidAttribute {
                attribute: "cuisine_id",
                ..
            })
        ));

        let bad_category = MenuItem::new(1, 9, 0, false);
        assert!(matches!(
            v.item_vector(&bad_category),
            Err(EngineError::InvalidAttribute {
                attribute: "category_id",
                ..
            })
        ));

        let bad_spice = MenuItem::new(1, 1, 6, false);
        assert!(matches!(
            v.item_vector(&bad_spice),
            Err(EngineError::InvalidAttribute {
                attribute: "spicy_level",
                ..
            })
        ));

        let zero_id = MenuItem::new(0, 1, 0, false);
        assert!(v.item_vector(&zero_id).is_err());
    }

    #[test]
    fn test_preference_vector_allows_multiple_ones() {
        let v = vectorizer();
        let prefs = TastePreferences {
            preferred_dish_ids: BTreeSet::from([1, 4]),
            preferred_category_ids: BTreeSet::from([2]),
            spicy_level: Some(1.6), // rounds to slot 2
            veg_preference: Some(true),
        };

        let vector = v.preference_vector(&prefs).unwrap();
        assert_eq!(vector[0], 1.0);
        assert_eq!(vector[3], 1.0);
        assert_eq!(vector[10 + 1], 1.0);
        assert_eq!(vector[10 + 8 + 2], 1.0);
        assert_eq!(vector[vector.len() - 1], 1.0);
    }

    #[test]
    fn test_absent_preferences_leave_blocks_zeroed() {
        let v = vectorizer();
        let vector = v.preference_vector(&TastePreferences::default()).unwrap();
        assert!(vector.iter().all(|&x| x == 0.0));

        // Absent veg preference is indistinguishable from explicit non-veg.
        let non_veg = v
            .preference_vector(&TastePreferences {
                veg_preference: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(vector, non_veg);
    }
}
