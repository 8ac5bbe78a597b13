//! Harvester configuration types.

use serde::{Deserialize, Serialize};

/// Top-level harvester configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Local JSON file holding already-ingested recipe ids.
    #[serde(default)]
    pub cache_file_path: String,

    /// Service-account JSON used to authenticate against Firestore.
    #[serde(default)]
    pub firebase_credentials_path: String,

    /// Spoonacular API key.
    #[serde(default)]
    pub spoonacular_api_key: String,

    /// Recipe source parameters.
    #[serde(default)]
    pub source: SourceConfig,

    /// Document store parameters.
    #[serde(default)]
    pub store: StoreConfig,

    /// Fetch and extract, but skip document writes and cache updates.
    #[serde(default)]
    pub dry_run: bool,
}

/// Recipe source (Spoonacular) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_base_url")]
    pub base_url: String,

    /// Recipes requested per run.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Document store (Firestore) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_base_url")]
    pub base_url: String,

    /// Collection the recipes are written to and hydrated from.
    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_source_base_url() -> String {
    "https://api.spoonacular.com".into()
}
fn default_store_base_url() -> String {
    "https://firestore.googleapis.com".into()
}
fn default_collection() -> String {
    "recipes".into()
}
fn default_batch_size() -> u32 {
    10
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_source_base_url(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_base_url(),
            collection: default_collection(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            cache_file_path: String::new(),
            firebase_credentials_path: String::new(),
            spoonacular_api_key: String::new(),
            source: SourceConfig::default(),
            store: StoreConfig::default(),
            dry_run: false,
        }
    }
}
