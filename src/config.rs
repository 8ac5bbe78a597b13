//! Configuration loader — merges config.toml, .env file, env vars and CLI flags.

use std::path::{Path, PathBuf};

use common::{Error, HarvestConfig};

use crate::Cli;

pub const CACHE_FILE_ENV: &str = "UID_CACHE_FILE_PATH";
pub const FIREBASE_CREDENTIALS_ENV: &str = "FIREBASE_CREDENTIALS_PATH";
pub const SPOONACULAR_API_KEY_ENV: &str = "SPOONACULAR_API_KEY";
const SPOONACULAR_BASE_URL_ENV: &str = "SPOONACULAR_BASE_URL";
const FIRESTORE_BASE_URL_ENV: &str = "FIRESTORE_BASE_URL";
const BATCH_SIZE_ENV: &str = "RECIPE_BATCH_SIZE";

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const MAX_BATCH_SIZE: u32 = 100;

fn parse_batch_size(raw: &str) -> Result<u32, Error> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| Error::Config(format!("{BATCH_SIZE_ENV} must be a positive integer")))
}

/// Read a TOML config file into a fresh config.
fn read_config_file(path: &Path) -> Result<HarvestConfig, Error> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Apply environment overrides; `lookup` stands in for `std::env::var`.
pub fn apply_env<F>(config: &mut HarvestConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(CACHE_FILE_ENV) {
        config.cache_file_path = path;
    }
    if let Some(path) = lookup(FIREBASE_CREDENTIALS_ENV) {
        config.firebase_credentials_path = path;
    }
    if let Some(key) = lookup(SPOONACULAR_API_KEY_ENV) {
        config.spoonacular_api_key = key;
    }
    if let Some(url) = lookup(SPOONACULAR_BASE_URL_ENV) {
        config.source.base_url = url;
    }
    if let Some(url) = lookup(FIRESTORE_BASE_URL_ENV) {
        config.store.base_url = url;
    }
    if let Some(raw) = lookup(BATCH_SIZE_ENV) {
        config.source.batch_size = parse_batch_size(&raw)?;
    }
    Ok(())
}

pub fn validate_config(config: &HarvestConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.cache_file_path.trim().is_empty() {
        issues.push(format!("{CACHE_FILE_ENV} is required"));
    }
    if config.firebase_credentials_path.trim().is_empty() {
        issues.push(format!("{FIREBASE_CREDENTIALS_ENV} is required"));
    }
    if config.spoonacular_api_key.trim().is_empty() {
        issues.push(format!("{SPOONACULAR_API_KEY_ENV} is required"));
    }
    if config.source.batch_size == 0 || config.source.batch_size > MAX_BATCH_SIZE {
        issues.push(format!("source.batch_size must be in 1..={MAX_BATCH_SIZE}"));
    }
    if config.source.timeout_secs == 0 {
        issues.push("source.timeout_secs must be > 0".into());
    }
    if config.store.timeout_secs == 0 {
        issues.push("store.timeout_secs must be > 0".into());
    }
    if config.store.collection.trim().is_empty() {
        issues.push("store.collection must not be empty".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load harvester configuration from config file, environment and CLI flags.
pub fn load_config(cli: &Cli) -> Result<HarvestConfig, Error> {
    // 1. Start with defaults, or the config file when present.
    let explicit = cli.config.is_some();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = if explicit || config_path.exists() {
        read_config_file(&config_path)?
    } else {
        HarvestConfig::default()
    };

    // 2. Load .env file from the working directory or its parents.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 3. Environment variables.
    apply_env(&mut config, |name| std::env::var(name).ok())?;

    // 4. CLI flags (highest priority).
    if let Some(ref path) = cli.cache_file {
        config.cache_file_path = path.display().to_string();
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    validate_config(&config)?;
    Ok(config)
}
