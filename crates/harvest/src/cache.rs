//! File-backed cache of already-ingested recipe ids.
//!
//! The file is a JSON object mapping the id (as a string) to `true`. It is
//! read once at startup, hydrated from the document store when it yields
//! nothing, and rewritten in full after every insertion. Entries are never
//! removed.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use common::Result;
use tracing::{debug, info, warn};

use crate::backends::DocumentStore;

/// Where the initial id set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationSource {
    LocalFile(usize),
    Remote(usize),
}

#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    entries: BTreeMap<String, bool>,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Read the cache file.
    ///
    /// A missing, empty, unreadable or malformed file yields an empty map.
    pub fn load(&self) -> BTreeMap<String, bool> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache file at {}", self.path.display());
                return BTreeMap::new();
            }
            Err(e) => {
                warn!("Could not read cache file {}: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };

        if contents.trim().is_empty() {
            return BTreeMap::new();
        }

        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring malformed cache file {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }

    /// Seed the cache with every document id in `collection` and persist it.
    pub async fn hydrate_from_remote(
        &mut self,
        store: &dyn DocumentStore,
        collection: &str,
    ) -> Result<usize> {
        let ids = store.list_document_ids(collection).await?;
        for id in ids {
            self.entries.insert(id, true);
        }
        self.save()?;
        Ok(self.entries.len())
    }

    /// Load the local file, falling back to remote hydration when it is empty.
    ///
    /// A file holding `{}` counts as empty, so an empty remote collection is
    /// re-scanned on every run.
    pub async fn initialize(
        &mut self,
        store: &dyn DocumentStore,
        collection: &str,
    ) -> Result<HydrationSource> {
        self.entries = self.load();
        if !self.entries.is_empty() {
            info!(
                "Loaded {} cached recipe ids from {}",
                self.entries.len(),
                self.path.display()
            );
            return Ok(HydrationSource::LocalFile(self.entries.len()));
        }

        info!("Local cache empty, hydrating from '{}' collection", collection);
        let count = self.hydrate_from_remote(store, collection).await?;
        info!("Hydrated {} recipe ids from the document store", count);
        Ok(HydrationSource::Remote(count))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    /// Mark `id` as ingested and rewrite the cache file.
    pub fn add(&mut self, id: &str) -> Result<()> {
        self.entries.insert(id.to_string(), true);
        self.save()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_vec(&self.entries)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}
