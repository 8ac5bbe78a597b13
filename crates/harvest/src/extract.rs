//! Derived fields of a stored recipe.
//!
//! Pure functions over a fetched [`RecipeRecord`]: equipment names, nutrition
//! facts parsed out of the summary's `<b>` fragments, the calorie count, and
//! the flattened [`StoredRecipe`] document built from them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use common::{
    Error, Ingredient, InstructionGroup, NutritionCategory, NutritionMap, RecipeRecord, Result,
};
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use tracing::debug;

pub const NO_INSTRUCTIONS: &str = "No instructions provided";

static BOLD_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<b>(.*?)</b>").expect("bold fragment regex"));

static NOT_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z\s]").expect("cleanup regex"));

/// Tested in this order; the first hit classifies a fragment.
static CATEGORY_PATTERNS: LazyLock<Vec<(NutritionCategory, Regex)>> = LazyLock::new(|| {
    [
        (NutritionCategory::CostPerServing, r"\d+ cents per serving"),
        (NutritionCategory::Protein, r"\d+g of protein"),
        (NutritionCategory::Fat, r"\d+g of fat"),
        (NutritionCategory::Calories, r"\d+ calories"),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, Regex::new(pattern).expect("nutrition regex")))
    .collect()
});

/// Distinct equipment names across every step of every instruction group.
pub fn extract_equipment(groups: &[InstructionGroup]) -> BTreeSet<String> {
    groups
        .iter()
        .flat_map(|group| &group.steps)
        .flat_map(|step| &step.equipment)
        .map(|equipment| equipment.name.clone())
        .collect()
}

/// Pull nutrition facts out of the `<b>...</b>` fragments of a summary.
///
/// Fragments are visited in document order. A later fragment in the same
/// category replaces the earlier value.
pub fn categorize_nutrition(summary: &str) -> NutritionMap {
    let mut facts = NutritionMap::new();

    for capture in BOLD_FRAGMENT.captures_iter(summary) {
        let fragment = &capture[1];
        let hit = CATEGORY_PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(fragment));

        if let Some((category, _)) = hit {
            let cleaned = NOT_ALPHANUMERIC.replace_all(fragment, "").into_owned();
            debug!("Nutrition fact {}: {}", category, cleaned);
            facts.insert(*category, cleaned);
        }
    }

    facts
}

/// Integer calorie count; 0 when unknown or when no digits survive cleanup.
pub fn derive_calories(facts: &NutritionMap) -> i64 {
    facts
        .get(&NutritionCategory::Calories)
        .map(|value| value.chars().filter(char::is_ascii_digit).collect::<String>())
        .and_then(|digits| digits.parse::<i64>().ok())
        .unwrap_or(0)
}

/// Render an ingredient amount: `2` → "2", `2.0` → "2.0", `0.5` → "0.5".
pub fn format_amount(amount: &Number) -> String {
    if !amount.is_f64() {
        return amount.to_string();
    }
    let value = amount.as_f64().unwrap_or_default();
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Ingredient name → "amount unit". Repeated names keep the last entry.
pub fn build_ingredients(ingredients: &[Ingredient]) -> BTreeMap<String, String> {
    ingredients
        .iter()
        .map(|i| (i.name.clone(), format!("{} {}", format_amount(&i.amount), i.unit)))
        .collect()
}

/// The document written to the `recipes` collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecipe {
    pub title: String,
    pub ingredients: BTreeMap<String, String>,
    pub instructions: String,
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
    /// `healthScore` as received; integer scores stay integers.
    pub healthiness: Number,
    pub calories: i64,
    pub time: i64,
    pub servings: i64,
    pub image: String,
    pub source: String,
    pub equipment: Vec<String>,
    pub summary: String,
    pub nutritional: NutritionMap,
    /// Cleaned "Cost per serving" fact; stored as the integer 0 when absent.
    #[serde(serialize_with = "cost_or_zero")]
    pub cost: Option<String>,
}

fn cost_or_zero<S: Serializer>(cost: &Option<String>, s: S) -> std::result::Result<S::Ok, S::Error> {
    match cost {
        Some(value) => s.serialize_str(value),
        None => s.serialize_i64(0),
    }
}

impl StoredRecipe {
    pub fn from_record(recipe: &RecipeRecord) -> Self {
        let nutritional = categorize_nutrition(&recipe.summary);
        let calories = derive_calories(&nutritional);
        let cost = nutritional.get(&NutritionCategory::CostPerServing).cloned();

        let instructions = recipe
            .instructions
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(NO_INSTRUCTIONS)
            .to_string();

        Self {
            title: recipe.title.clone(),
            ingredients: build_ingredients(&recipe.extended_ingredients),
            instructions,
            vegetarian: recipe.vegetarian,
            vegan: recipe.vegan,
            gluten_free: recipe.gluten_free,
            dairy_free: recipe.dairy_free,
            healthiness: recipe.health_score.clone().unwrap_or_else(|| Number::from(0)),
            calories,
            time: recipe.ready_in_minutes,
            servings: recipe.servings,
            image: recipe.image.clone(),
            source: recipe.source_url.clone(),
            equipment: extract_equipment(&recipe.analyzed_instructions)
                .into_iter()
                .collect(),
            summary: recipe.summary.clone(),
            nutritional,
            cost,
        }
    }

    /// The document as a plain JSON field map.
    pub fn to_fields(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(Error::Other(format!(
                "recipe document serialized to a non-object: {other}"
            ))),
        }
    }
}
