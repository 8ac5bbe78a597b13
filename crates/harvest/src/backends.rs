//! Seams between the pipeline and the outside world.

use async_trait::async_trait;
use common::Result;
use firestore_client::FirestoreClient;
use serde_json::{Map, Value};
use spoonacular_client::SpoonacularClient;

/// Where recipe batches come from.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// One batch of raw records. An empty batch ends the run.
    async fn fetch_batch(&self) -> Result<Vec<Value>>;
}

/// Collection/document addressed store the recipes are written to.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_document_ids(&self, collection: &str) -> Result<Vec<String>>;

    /// Create or overwrite `collection/id` with `data`.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<()>;
}

#[async_trait]
impl RecipeSource for SpoonacularClient {
    async fn fetch_batch(&self) -> Result<Vec<Value>> {
        SpoonacularClient::fetch_batch(self).await
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn list_document_ids(&self, collection: &str) -> Result<Vec<String>> {
        FirestoreClient::list_document_ids(self, collection).await
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<()> {
        FirestoreClient::set_document(self, collection, id, data).await
    }
}
