//! Recipe catalog and ingredient calorie table.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Calories assumed for ingredients missing from the table.
pub const DEFAULT_CALORIES: u32 = 50;

/// Ingredients excluded by a vegetarian preference.
pub const MEAT_INGREDIENTS: &[&str] = &["salmon", "chicken_breast"];

/// Ingredients that qualify a recipe as high-protein.
pub const PROTEIN_INGREDIENTS: &[&str] = &["salmon", "chicken_breast", "chickpeas"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

impl Recipe {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        ingredients: &[&str],
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
            instructions: instructions.into(),
        }
    }

    pub fn contains_any(&self, ingredients: &[&str]) -> bool {
        self.ingredients
            .iter()
            .any(|own| ingredients.contains(&own.as_str()))
    }
}

/// Immutable recipes plus calories per 100 g, keyed by ingredient id.
#[derive(Debug, Clone, Default)]
pub struct MealCatalog {
    recipes: Vec<Recipe>,
    calories: HashMap<String, u32>,
}

static BUILTIN: LazyLock<Arc<MealCatalog>> = LazyLock::new(|| {
    let recipes = vec![
        Recipe::new(
            "quinoa_power_bowl",
            "Quinoa Power Bowl",
            &["quinoa", "chickpeas", "spinach"],
            "Cook quinoa, add roasted chickpeas and fresh spinach. Dress with lemon vinaigrette.",
        ),
        Recipe::new(
            "salmon_avocado_salad",
            "Salmon Avocado Salad",
            &["salmon", "avocado", "mixed_greens"],
            "Grill salmon, slice avocado, toss with mixed greens and olive oil dressing.",
        ),
        Recipe::new(
            "chicken_veggie_wrap",
            "Chicken Veggie Wrap",
            &["chicken_breast", "bell_peppers", "whole_wheat_tortilla"],
            "Grill chicken, sauté peppers, wrap in whole wheat tortilla with hummus.",
        ),
    ];
    let calories = [
        ("quinoa", 120),
        ("chickpeas", 164),
        ("spinach", 23),
        ("salmon", 208),
        ("avocado", 160),
        ("mixed_greens", 15),
        ("chicken_breast", 165),
        ("bell_peppers", 31),
        ("whole_wheat_tortilla", 245),
    ];
    Arc::new(MealCatalog::new(recipes, calories))
});

impl MealCatalog {
    pub fn new<K: Into<String>>(
        recipes: Vec<Recipe>,
        calories: impl IntoIterator<Item = (K, u32)>,
    ) -> Self {
        Self {
            recipes,
            calories: calories.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// The three-recipe, nine-ingredient catalog shipped with the tools.
    pub fn builtin() -> Arc<MealCatalog> {
        Arc::clone(&BUILTIN)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn calories_per_100g(&self, ingredient: &str) -> Option<u32> {
        self.calories.get(ingredient).copied()
    }

    pub fn ingredient_count(&self) -> usize {
        self.calories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_shape() {
        let catalog = MealCatalog::builtin();
        assert_eq!(catalog.recipes().len(), 3);
        assert_eq!(catalog.ingredient_count(), 9);
        for recipe in catalog.recipes() {
            for ingredient in &recipe.ingredients {
                assert!(catalog.calories_per_100g(ingredient).is_some(), "{ingredient}");
            }
        }
        assert_eq!(catalog.calories_per_100g("whole_wheat_tortilla"), Some(245));
        assert_eq!(catalog.calories_per_100g("tofu"), None);
    }

    #[test]
    fn builtin_is_shared() {
        assert!(Arc::ptr_eq(&MealCatalog::builtin(), &MealCatalog::builtin()));
    }

    #[test]
    fn meat_detection() {
        let catalog = MealCatalog::builtin();
        let bowl = catalog.recipe("quinoa_power_bowl").unwrap();
        let wrap = catalog.recipe("chicken_veggie_wrap").unwrap();
        assert!(!bowl.contains_any(MEAT_INGREDIENTS));
        assert!(bowl.contains_any(PROTEIN_INGREDIENTS));
        assert!(wrap.contains_any(MEAT_INGREDIENTS));
    }
}
