//! recipe-harvester: one-shot Spoonacular → Firestore ingestion job.
//!
//! Each run:
//! 1. Loads the local id cache (hydrating it from Firestore when empty)
//! 2. Fetches a batch of random recipes
//! 3. Writes every recipe not seen before and records its id
//!
//! Exits non-zero only on configuration, credential, hydration or
//! source-schema errors.

mod config;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use common::{Error, HarvestConfig};
use firestore_client::{FirestoreClient, ServiceAccount};
use harvest::{CacheStore, Pipeline, PipelineOptions, RunSummary};
use spoonacular_client::SpoonacularClient;

/// Spoonacular recipe harvester
#[derive(Parser, Debug)]
#[command(name = "recipe-harvester", about = "Ingest random Spoonacular recipes into Firestore")]
pub struct Cli {
    /// Fetch and extract, but do not write documents or update the cache.
    #[arg(long)]
    dry_run: bool,

    /// Override the cache file path (UID_CACHE_FILE_PATH).
    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// TOML config file (defaults to ./config.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

async fn run(cfg: &HarvestConfig) -> Result<RunSummary, Error> {
    let account = ServiceAccount::from_file(&cfg.firebase_credentials_path)?;
    let firestore = FirestoreClient::new(&account, &cfg.store)?;
    let spoonacular = SpoonacularClient::new(cfg.spoonacular_api_key.clone(), &cfg.source)?;

    let cache = CacheStore::new(&cfg.cache_file_path);
    let options = PipelineOptions {
        collection: cfg.store.collection.clone(),
        dry_run: cfg.dry_run,
    };

    let mut pipeline = Pipeline::new(&spoonacular, &firestore, cache, options);
    pipeline.run().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "recipe_harvester=info,harvest=info,spoonacular_client=info,firestore_client=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Harvesting {} recipes into '{}' (cache: {}{})",
        cfg.source.batch_size,
        cfg.store.collection,
        cfg.cache_file_path,
        if cfg.dry_run { ", dry run" } else { "" }
    );

    match run(&cfg).await {
        Ok(summary) => {
            info!("Run finished: {}", summary);
        }
        Err(e) => {
            error!("Harvest aborted: {}", e);
            std::process::exit(1);
        }
    }
}
