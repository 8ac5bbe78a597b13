//! Ingestion run: hydrate the cache, fetch a batch, store what is new.
//!
//! Records are handled one at a time. A record's document is written before
//! its id enters the cache, so a crash in between only causes a harmless
//! rewrite of the same document on the next run.

use std::fmt;

use common::{RecipeRecord, Result};
use serde_json::Value;
use tracing::{error, info};

use crate::backends::{DocumentStore, RecipeSource};
use crate::cache::{CacheStore, HydrationSource};
use crate::extract::StoredRecipe;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Collection recipes are written to and hydrated from.
    pub collection: String,
    /// Skip document writes and cache updates.
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            collection: "recipes".into(),
            dry_run: false,
        }
    }
}

/// Terminal state of one fetched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Stored,
    Duplicate,
    /// Dry run: the record would have been stored.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub hydration: HydrationSource,
    pub fetched: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched={} stored={} skipped={} duplicates={} failed={}",
            self.fetched, self.stored, self.skipped, self.duplicates, self.failed
        )
    }
}

pub struct Pipeline<'a> {
    source: &'a dyn RecipeSource,
    store: &'a dyn DocumentStore,
    cache: CacheStore,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        source: &'a dyn RecipeSource,
        store: &'a dyn DocumentStore,
        cache: CacheStore,
        options: PipelineOptions,
    ) -> Self {
        Self {
            source,
            store,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Run one ingestion pass.
    ///
    /// Per-record failures are logged and counted; only hydration and fetch
    /// errors abort the run.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let hydration = self
            .cache
            .initialize(self.store, &self.options.collection)
            .await?;

        let recipes = self.source.fetch_batch().await?;
        let mut summary = RunSummary {
            hydration,
            fetched: recipes.len(),
            stored: 0,
            duplicates: 0,
            skipped: 0,
            failed: 0,
        };

        if recipes.is_empty() {
            info!("No recipes to store");
            return Ok(summary);
        }

        for raw in &recipes {
            match self.process_record(raw).await {
                Ok(RecordOutcome::Stored) => summary.stored += 1,
                Ok(RecordOutcome::Duplicate) => summary.duplicates += 1,
                Ok(RecordOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    let title = raw.get("title").and_then(Value::as_str).unwrap_or("<untitled>");
                    error!("An error occurred while storing recipe '{}': {}", title, e);
                    summary.failed += 1;
                }
            }
        }

        if self.options.dry_run {
            info!(
                "Dry run complete: {} new, {} duplicate, {} failed",
                summary.skipped, summary.duplicates, summary.failed
            );
        } else {
            info!(
                "Recipes have been stored: {} new, {} duplicate, {} failed",
                summary.stored, summary.duplicates, summary.failed
            );
        }
        Ok(summary)
    }

    async fn process_record(&mut self, raw: &Value) -> Result<RecordOutcome> {
        let recipe = RecipeRecord::from_value(raw)?;
        let id = recipe.id.to_string();

        if self.cache.contains(&id) {
            info!("Duplicate recipe found: {}", recipe.title);
            return Ok(RecordOutcome::Duplicate);
        }

        let fields = StoredRecipe::from_record(&recipe).to_fields()?;

        if self.options.dry_run {
            info!("Would store recipe: {}", recipe.title);
            return Ok(RecordOutcome::Skipped);
        }

        self.store
            .set_document(&self.options.collection, &id, &fields)
            .await?;
        info!("Stored recipe: {}", recipe.title);

        self.cache.add(&id)?;
        Ok(RecordOutcome::Stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::Error;
    use serde_json::{json, Map, Value};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        List,
        /// Document id, and whether the cache file already held it at write time.
        Write { id: String, cached_before_write: bool },
    }

    struct FakeSource {
        batch: Vec<Value>,
    }

    #[async_trait]
    impl RecipeSource for FakeSource {
        async fn fetch_batch(&self) -> Result<Vec<Value>> {
            Ok(self.batch.clone())
        }
    }

    struct FakeStore {
        cache_path: PathBuf,
        remote_ids: Vec<String>,
        fail_ids: Vec<String>,
        events: Mutex<Vec<Event>>,
        docs: Mutex<Vec<(String, Map<String, Value>)>>,
    }

    impl FakeStore {
        fn new(cache_path: PathBuf, remote_ids: &[&str]) -> Self {
            Self {
                cache_path,
                remote_ids: remote_ids.iter().map(|s| s.to_string()).collect(),
                fail_ids: Vec::new(),
                events: Mutex::new(Vec::new()),
                docs: Mutex::new(Vec::new()),
            }
        }

        fn events(&self) -> Vec<Event> {
            self.events.lock().expect("events lock").clone()
        }

        fn writes(&self) -> usize {
            self.docs.lock().expect("docs lock").len()
        }
    }

    #[async_trait]
    impl DocumentStore for FakeStore {
        async fn list_document_ids(&self, collection: &str) -> Result<Vec<String>> {
            assert_eq!(collection, "recipes");
            self.events.lock().expect("events lock").push(Event::List);
            Ok(self.remote_ids.clone())
        }

        async fn set_document(
            &self,
            collection: &str,
            id: &str,
            data: &Map<String, Value>,
        ) -> Result<()> {
            assert_eq!(collection, "recipes");
            if self.fail_ids.iter().any(|f| f == id) {
                return Err(Error::Store {
                    status: 500,
                    message: "backend unavailable".into(),
                });
            }
            let cached_before_write = CacheStore::new(&self.cache_path).load().contains_key(id);
            self.events.lock().expect("events lock").push(Event::Write {
                id: id.to_string(),
                cached_before_write,
            });
            self.docs
                .lock()
                .expect("docs lock")
                .push((id.to_string(), data.clone()));
            Ok(())
        }
    }

    fn record(id: u64, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "extendedIngredients": [{"name": "water", "amount": 1, "unit": "cup"}],
            "summary": "<b>100 calories</b>"
        })
    }

    #[tokio::test]
    async fn test_duplicate_skipped_new_written_then_cached() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("uids.json");
        std::fs::write(&path, r#"{"1": true}"#).expect("seed cache");

        let source = FakeSource {
            batch: vec![record(1, "Known Soup"), record(2, "New Stew")],
        };
        let store = FakeStore::new(path.clone(), &[]);
        let mut pipeline =
            Pipeline::new(&source, &store, CacheStore::new(&path), PipelineOptions::default());

        let summary = pipeline.run().await.expect("run should succeed");

        assert_eq!(summary.hydration, HydrationSource::LocalFile(1));
        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.stored, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(
            store.events(),
            vec![Event::Write {
                id: "2".into(),
                cached_before_write: false
            }]
        );
        assert!(pipeline.cache().contains("2"));
        assert_eq!(CacheStore::new(&path).load().len(), 2);

        let docs = store.docs.lock().expect("docs lock");
        assert_eq!(docs[0].1["calories"], json!(100));
        assert_eq!(docs[0].1["title"], json!("New Stew"));
    }

    #[tokio::test]
    async fn test_empty_batch_still_hydrates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("uids.json");

        let source = FakeSource { batch: Vec::new() };
        let store = FakeStore::new(path.clone(), &["5", "6"]);
        let mut pipeline =
            Pipeline::new(&source, &store, CacheStore::new(&path), PipelineOptions::default());

        let summary = pipeline.run().await.expect("run should succeed");
        assert_eq!(summary.fetched, 0);
        assert_eq!(summary.hydration, HydrationSource::Remote(2));
        assert_eq!(store.events(), vec![Event::List]);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_hydrated_ids_are_duplicates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("uids.json");

        let source = FakeSource {
            batch: vec![record(5, "Remote Pie")],
        };
        let store = FakeStore::new(path.clone(), &["5"]);
        let mut pipeline =
            Pipeline::new(&source, &store, CacheStore::new(&path), PipelineOptions::default());

        let summary = pipeline.run().await.expect("run should succeed");
        assert_eq!(summary.duplicates, 1);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_record_failure_does_not_abort_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("uids.json");
        std::fs::write(&path, r#"{"99": true}"#).expect("seed cache");

        let source = FakeSource {
            batch: vec![record(3, "Broken"), record(4, "Fine")],
        };
        let mut store = FakeStore::new(path.clone(), &[]);
        store.fail_ids.push("3".into());
        let mut pipeline =
            Pipeline::new(&source, &store, CacheStore::new(&path), PipelineOptions::default());

        let summary = pipeline.run().await.expect("run should succeed");
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.stored, 1);
        assert!(!pipeline.cache().contains("3"), "failed write must not be cached");
        assert!(pipeline.cache().contains("4"));
    }

    #[tokio::test]
    async fn test_same_id_twice_in_batch_written_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("uids.json");
        std::fs::write(&path, r#"{"99": true}"#).expect("seed cache");

        let source = FakeSource {
            batch: vec![record(8, "Twice"), record(8, "Twice")],
        };
        let store = FakeStore::new(path.clone(), &[]);
        let mut pipeline =
            Pipeline::new(&source, &store, CacheStore::new(&path), PipelineOptions::default());

        let summary = pipeline.run().await.expect("run should succeed");
        assert_eq!(summary.stored, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("uids.json");
        std::fs::write(&path, r#"{"99": true}"#).expect("seed cache");

        let source = FakeSource {
            batch: vec![record(10, "Maybe")],
        };
        let store = FakeStore::new(path.clone(), &[]);
        let options = PipelineOptions {
            dry_run: true,
            ..PipelineOptions::default()
        };
        let mut pipeline = Pipeline::new(&source, &store, CacheStore::new(&path), options);

        let summary = pipeline.run().await.expect("run should succeed");
        assert_eq!(summary.skipped, 1);
        assert_eq!(store.writes(), 0);
        assert_eq!(
            summary.to_string(),
            "fetched=1 stored=0 skipped=1 duplicates=0 failed=0"
        );
        assert!(!CacheStore::new(&path).load().contains_key("10"));
    }

    #[tokio::test]
    async fn test_malformed_record_fails_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("uids.json");
        std::fs::write(&path, r#"{"99": true}"#).expect("seed cache");

        let source = FakeSource {
            batch: vec![
                json!({"id": 20, "title": "No Ingredients"}),
                json!({
                    "id": 21,
                    "title": "Null Summary",
                    "extendedIngredients": [],
                    "summary": null
                }),
                record(22, "Plain"),
            ],
        };
        let store = FakeStore::new(path.clone(), &[]);
        let mut pipeline =
            Pipeline::new(&source, &store, CacheStore::new(&path), PipelineOptions::default());

        let summary = pipeline.run().await.expect("a bad record is not fatal");
        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.stored, 2);
        assert!(!pipeline.cache().contains("20"));
        assert!(pipeline.cache().contains("21"));
        assert!(pipeline.cache().contains("22"));
    }
}
