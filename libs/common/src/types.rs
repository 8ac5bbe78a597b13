//! Domain types shared across the harvester.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::Error;

// ── Spoonacular Recipe Types ──────────────────────────────────────────

/// Response from GET /recipes/random.
///
/// Records stay raw here; each one is decoded on its own so a single bad
/// record cannot sink the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomRecipesResponse {
    pub recipes: Vec<Value>,
}

/// A recipe as returned by the Spoonacular API.
///
/// Only the fields the harvester consumes are modelled. `id`, `title` and
/// `extendedIngredients` are required; every other field treats `null` the
/// same as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub id: u64,
    pub title: String,
    pub extended_ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analyzed_instructions: Vec<InstructionGroup>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vegetarian: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vegan: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gluten_free: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dairy_free: bool,
    /// Raw JSON number, so an integer score is stored as an integer.
    #[serde(default)]
    pub health_score: Option<Number>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ready_in_minutes: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub servings: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_url: String,
    /// HTML-flavored blurb; nutrition facts are wrapped in `<b>` tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

impl RecipeRecord {
    /// Decode one raw record from a batch.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        Self::deserialize(value).map_err(|e| Error::SourceSchema(e.to_string()))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of `extendedIngredients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Kept as a raw JSON number so `2` and `2.0` print differently.
    pub amount: serde_json::Number,
    pub unit: String,
}

/// One group of `analyzedInstructions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructionGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<InstructionStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructionStep {
    #[serde(default)]
    pub number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub step: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub equipment: Vec<Equipment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub name: String,
}

// ── Nutrition ─────────────────────────────────────────────────────────

/// Nutrition facts recognised in a recipe summary.
///
/// Variant order is the order fragments are tested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NutritionCategory {
    #[serde(rename = "Cost per serving")]
    CostPerServing,
    Protein,
    Fat,
    Calories,
}

impl NutritionCategory {
    /// Key used in the stored `nutritional` map.
    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionCategory::CostPerServing => "Cost per serving",
            NutritionCategory::Protein => "Protein",
            NutritionCategory::Fat => "Fat",
            NutritionCategory::Calories => "Calories",
        }
    }
}

impl fmt::Display for NutritionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cleaned nutrition strings keyed by category.
pub type NutritionMap = BTreeMap<NutritionCategory, String>;
