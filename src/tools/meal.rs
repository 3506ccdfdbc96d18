//! Healthy meal toolkit.
//!
//! `suggest_healthy_meal` runs a fixed three-step pipeline:
//! [`select_recipe`] -> [`lookup_calories`] -> [`aggregate_nutrition`].
//! The pipeline reports a typed [`MealError`]; the tool boundary turns it into
//! one of two user-facing sentences.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::catalog::{MealCatalog, Recipe, DEFAULT_CALORIES, MEAT_INGREDIENTS, PROTEIN_INGREDIENTS};
use crate::context::{RandomSource, ToolContext};
use crate::error::{CoachError, MealError, Result};
use crate::tool::{Tool, ToolRegistry};

pub const NO_SUITABLE_RECIPE: &str = "Unable to find a suitable recipe. Please try again.";
pub const MEAL_UNAVAILABLE: &str = "Unable to generate meal suggestion. Please try again later.";

/// Create the `healthy_meal_tool` toolkit backed by the built-in catalog.
pub fn healthy_meal_toolkit(ctx: &ToolContext) -> ToolRegistry {
    let mut registry = ctx.registry();
    registry.register(HealthyMealTool::new(ctx));
    registry
}

/// Step 1: filter the catalog by preference and pick one candidate at random.
///
/// "vegetarian" drops recipes with meat or fish. Otherwise "high-protein"
/// narrows to protein-rich recipes, keeping the full catalog when none exist.
pub fn select_recipe<'c, R: Rng + ?Sized>(
    catalog: &'c MealCatalog,
    preference: Option<&str>,
    rng: &mut R,
) -> std::result::Result<&'c Recipe, MealError> {
    info!(?preference, "selecting recipe");
    let mut candidates: Vec<&Recipe> = catalog.recipes().iter().collect();

    if let Some(pref) = preference.map(str::to_lowercase) {
        if pref.contains("vegetarian") {
            candidates.retain(|recipe| !recipe.contains_any(MEAT_INGREDIENTS));
        } else if pref.contains("high-protein") {
            let protein: Vec<&Recipe> = candidates
                .iter()
                .copied()
                .filter(|recipe| recipe.contains_any(PROTEIN_INGREDIENTS))
                .collect();
            if protein.is_empty() {
                debug!("no protein-rich recipe in catalog, using all recipes");
            } else {
                candidates = protein;
            }
        }
    }

    if candidates.is_empty() {
        return Err(MealError::NoMatch {
            preference: preference.map(str::to_string),
        });
    }
    Ok(candidates[rng.gen_range(0..candidates.len())])
}

/// Step 2: calories per 100 g for each ingredient. Unknown ingredients get
/// [`DEFAULT_CALORIES`].
pub fn lookup_calories<S: AsRef<str>>(
    catalog: &MealCatalog,
    ingredients: &[S],
) -> BTreeMap<String, u32> {
    let names: Vec<&str> = ingredients.iter().map(|s| s.as_ref()).collect();
    info!(ingredients = ?names, "looking up calorie counts");
    names
        .into_iter()
        .map(|ingredient| {
            let calories = catalog.calories_per_100g(ingredient).unwrap_or_else(|| {
                warn!(ingredient, "unknown ingredient, using default calories");
                DEFAULT_CALORIES
            });
            (ingredient.to_string(), calories)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub total_calories: u32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub ingredient_breakdown: BTreeMap<String, u32>,
}

/// Step 3: total calories and a fixed 20/50/30 protein/carb/fat split.
pub fn aggregate_nutrition(calories: BTreeMap<String, u32>) -> NutritionSummary {
    let total_calories: u32 = calories.values().sum();
    let total = f64::from(total_calories);
    NutritionSummary {
        total_calories,
        protein_g: round_tenth(total * 0.20 / 4.0),
        carbs_g: round_tenth(total * 0.50 / 4.0),
        fat_g: round_tenth(total * 0.30 / 9.0),
        ingredient_breakdown: calories,
    }
}

/// One decimal place, ties to even on the exact binary value.
fn round_tenth(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|exact| exact.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven))
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}

/// "whole_wheat_tortilla" -> "Whole Wheat Tortilla".
fn display_ingredient(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealRecommendation {
    pub recipe: Recipe,
    pub nutrition: NutritionSummary,
}

impl fmt::Display for MealRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nutrition = &self.nutrition;
        writeln!(f, "🍽️ HEALTHY MEAL RECOMMENDATION")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f)?;
        writeln!(f, "📋 **{}**", self.recipe.name)?;
        writeln!(f)?;
        writeln!(f, "🥗 **Ingredients:**")?;
        for ingredient in &self.recipe.ingredients {
            let calories = nutrition
                .ingredient_breakdown
                .get(ingredient)
                .copied()
                .unwrap_or(0);
            writeln!(f, "  • {} ({calories} cal)", display_ingredient(ingredient))?;
        }
        writeln!(f)?;
        writeln!(f, "👨‍🍳 **Instructions:**")?;
        writeln!(f, "{}", self.recipe.instructions)?;
        writeln!(f)?;
        writeln!(f, "📊 **Nutritional Information:**")?;
        writeln!(f, "  • Total Calories: {} cal", nutrition.total_calories)?;
        writeln!(f, "  • Protein: {:.1}g", nutrition.protein_g)?;
        writeln!(f, "  • Carbohydrates: {:.1}g", nutrition.carbs_g)?;
        writeln!(f, "  • Fat: {:.1}g", nutrition.fat_g)?;
        writeln!(f)?;
        writeln!(
            f,
            "💡 **Note:** This meal is designed to support your fitness goals \
             while considering your ACL recovery needs."
        )
    }
}

/// `suggest_healthy_meal(dietary_preferences = None)`.
#[derive(Debug, Clone)]
pub struct HealthyMealTool {
    catalog: Arc<MealCatalog>,
    random: RandomSource,
}

impl HealthyMealTool {
    pub fn new(ctx: &ToolContext) -> Self {
        Self::with_catalog(MealCatalog::builtin(), ctx)
    }

    pub fn with_catalog(catalog: Arc<MealCatalog>, ctx: &ToolContext) -> Self {
        Self {
            catalog,
            random: ctx.random.clone(),
        }
    }

    pub fn recommend(
        &self,
        preference: Option<&str>,
    ) -> std::result::Result<MealRecommendation, MealError> {
        info!("starting healthy meal suggestion workflow");
        let recipe = self
            .random
            .with_rng(|rng| select_recipe(&self.catalog, preference, rng).cloned())?;
        let calories = lookup_calories(&self.catalog, &recipe.ingredients);
        let nutrition = aggregate_nutrition(calories);
        info!(
            recipe = %recipe.id,
            total = nutrition.total_calories,
            "meal suggestion workflow completed"
        );
        Ok(MealRecommendation { recipe, nutrition })
    }

    /// Rendered recommendation, or one of the two failure sentences.
    pub fn suggest_healthy_meal(&self, preference: Option<&str>) -> String {
        render_outcome(self.recommend(preference))
    }
}

fn render_outcome(outcome: std::result::Result<MealRecommendation, MealError>) -> String {
    match outcome {
        Ok(recommendation) => recommendation.to_string(),
        Err(MealError::NoMatch { preference }) => {
            warn!(?preference, "no recipe matched dietary preference");
            NO_SUITABLE_RECIPE.to_string()
        }
        Err(MealError::Fault(err)) => {
            error!(error = %err, "error in healthy meal suggestion workflow");
            MEAL_UNAVAILABLE.to_string()
        }
    }
}

fn preference_argument(input: &Value) -> Result<Option<&str>> {
    match input.get("dietary_preferences") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(other) => Err(CoachError::invalid_argument(
            "dietary_preferences",
            format!("expected a string, got {other}"),
        )),
    }
}

#[async_trait]
impl Tool for HealthyMealTool {
    fn name(&self) -> &str {
        "suggest_healthy_meal"
    }

    fn description(&self) -> &str {
        "Suggest a healthy meal with ingredients, instructions and estimated nutrition. \
         Expects {\"dietary_preferences\": string} (optional, e.g. \"vegetarian\", \
         \"high-protein\")."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "dietary_preferences": {
                    "type": ["string", "null"],
                    "description": "Optional dietary preferences such as vegetarian or high-protein",
                }
            }
        }))
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let outcome = preference_argument(&input)
            .map_err(MealError::from)
            .and_then(|preference| self.recommend(preference));
        Ok(Value::String(render_outcome(outcome)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn calories(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn vegetarian_never_selects_meat() {
        let catalog = MealCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let recipe = select_recipe(&catalog, Some("vegetarian diet"), &mut rng).unwrap();
            assert!(!recipe.ingredients.iter().any(|i| i == "salmon" || i == "chicken_breast"));
            assert_eq!(recipe.id, "quinoa_power_bowl");
        }
    }

    #[test]
    fn vegetarian_match_is_case_insensitive() {
        let catalog = MealCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(2);
        let recipe = select_recipe(&catalog, Some("Strictly VEGETARIAN"), &mut rng).unwrap();
        assert_eq!(recipe.id, "quinoa_power_bowl");
    }

    #[test]
    fn high_protein_prefers_protein_recipes() {
        let catalog = MealCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let recipe = select_recipe(&catalog, Some("high-protein"), &mut rng).unwrap();
            assert!(recipe.contains_any(PROTEIN_INGREDIENTS));
        }
    }

    #[test]
    fn high_protein_falls_back_to_full_catalog() {
        let catalog = MealCatalog::new(
            vec![Recipe::new("green_salad", "Green Salad", &["spinach"], "Toss.")],
            [("spinach", 23)],
        );
        let mut rng = StdRng::seed_from_u64(4);
        let recipe = select_recipe(&catalog, Some("high-protein please"), &mut rng).unwrap();
        assert_eq!(recipe.id, "green_salad");
    }

    #[test]
    fn vegetarian_without_candidates_is_no_match() {
        let catalog = MealCatalog::new(
            vec![Recipe::new("steak", "Steak", &["chicken_breast"], "Grill.")],
            [("chicken_breast", 165)],
        );
        let mut rng = StdRng::seed_from_u64(5);
        let err = select_recipe(&catalog, Some("vegetarian"), &mut rng).unwrap_err();
        assert!(matches!(err, MealError::NoMatch { preference: Some(ref p) } if p == "vegetarian"));
    }

    #[test]
    fn no_preference_reaches_every_recipe() {
        let catalog = MealCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(6);
        let seen: std::collections::HashSet<String> = (0..200)
            .map(|_| select_recipe(&catalog, None, &mut rng).unwrap().id.clone())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn unknown_ingredient_logs_warning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let catalog = MealCatalog::builtin();
            lookup_calories(&catalog, &["quinoa", "dragonfruit"]);
        });

        let text = logs.text();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("unknown ingredient"), "{text}");
        assert!(text.contains("dragonfruit"), "{text}");
        assert!(!text.contains("ingredient=quinoa"), "{text}");
    }

    #[test]
    fn unknown_ingredient_defaults() {
        let catalog = MealCatalog::builtin();
        let looked_up = lookup_calories(&catalog, &["unknown_ingredient"]);
        assert_eq!(looked_up, calories(&[("unknown_ingredient", 50)]));

        let looked_up = lookup_calories(&catalog, &["quinoa", "tofu"]);
        assert_eq!(looked_up, calories(&[("quinoa", 120), ("tofu", 50)]));
    }

    #[test]
    fn aggregates_macros() {
        let summary = aggregate_nutrition(calories(&[("a", 100), ("b", 100)]));
        assert_eq!(summary.total_calories, 200);
        assert_eq!(summary.protein_g, 10.0);
        assert_eq!(summary.carbs_g, 25.0);
        assert_eq!(summary.fat_g, 6.7);
        assert_eq!(summary.ingredient_breakdown.len(), 2);
    }

    #[test]
    fn macros_round_half_to_even() {
        // 5 kcal: protein is exactly 0.25.
        let summary = aggregate_nutrition(calories(&[("x", 5)]));
        assert_eq!(summary.protein_g, 0.2);
        assert_eq!(summary.fat_g, 0.2);

        // 2 kcal: carbs are exactly 0.25.
        let summary = aggregate_nutrition(calories(&[("x", 2)]));
        assert_eq!(summary.carbs_g, 0.2);
        assert_eq!(summary.protein_g, 0.1);

        // 9 kcal: protein is stored just above 0.45.
        let summary = aggregate_nutrition(calories(&[("x", 9)]));
        assert_eq!(summary.protein_g, 0.5);

        // 3 kcal: carbs are exactly 0.375.
        let summary = aggregate_nutrition(calories(&[("x", 3)]));
        assert_eq!(summary.carbs_g, 0.4);
    }

    #[test]
    fn aggregates_empty_map() {
        let summary = aggregate_nutrition(BTreeMap::new());
        assert_eq!(summary.total_calories, 0);
        assert_eq!(summary.fat_g, 0.0);
    }

    #[test]
    fn title_cases_ingredients() {
        assert_eq!(display_ingredient("whole_wheat_tortilla"), "Whole Wheat Tortilla");
        assert_eq!(display_ingredient("quinoa"), "Quinoa");
        assert_eq!(display_ingredient("MIXED_greens"), "Mixed Greens");
    }

    #[test]
    fn vegetarian_recommendation_renders_bowl() {
        let tool = HealthyMealTool::new(&ToolContext::seeded(10));
        let text = tool.suggest_healthy_meal(Some("vegetarian"));
        assert!(text.contains("Quinoa Power Bowl"));
        assert!(text.contains("Total Calories: 307 cal"));
        assert!(text.contains("  • Chickpeas (164 cal)"));
        assert!(text.contains("  • Carbohydrates: 38.4g"));
        assert!(text.starts_with("🍽️ HEALTHY MEAL RECOMMENDATION\n"));
    }

    #[test]
    fn no_match_renders_recipe_sentence() {
        let catalog = Arc::new(MealCatalog::new(
            vec![Recipe::new("salmon_only", "Salmon", &["salmon"], "Bake.")],
            [("salmon", 208)],
        ));
        let tool = HealthyMealTool::with_catalog(catalog, &ToolContext::seeded(1));
        assert!(matches!(
            tool.recommend(Some("vegetarian")),
            Err(MealError::NoMatch { .. })
        ));
        assert_eq!(tool.suggest_healthy_meal(Some("vegetarian")), NO_SUITABLE_RECIPE);
    }

    #[tokio::test]
    async fn malformed_preference_renders_fault_sentence() {
        let tool = HealthyMealTool::new(&ToolContext::seeded(1));
        let output = tool.call(json!({"dietary_preferences": 42})).await.unwrap();
        assert_eq!(output, json!(MEAL_UNAVAILABLE));
    }

    #[tokio::test]
    async fn tool_call_without_preference() {
        let tool = HealthyMealTool::new(&ToolContext::seeded(12));
        let output = tool.call(json!({})).await.unwrap();
        let text = output.as_str().unwrap();
        assert!(text.contains("**Nutritional Information:**"));
        assert!(text.ends_with("ACL recovery needs.\n"));
    }
}
