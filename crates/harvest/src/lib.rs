//! Recipe ingestion engine.
//!
//! Deduplicates fetched recipes against a local id cache, derives the stored
//! document fields and writes new recipes to the document store.

pub mod backends;
pub mod cache;
pub mod extract;
pub mod pipeline;

pub use backends::{DocumentStore, RecipeSource};
pub use cache::{CacheStore, HydrationSource};
pub use extract::{
    build_ingredients, categorize_nutrition, derive_calories, extract_equipment, StoredRecipe,
};
pub use pipeline::{Pipeline, PipelineOptions, RecordOutcome, RunSummary};
