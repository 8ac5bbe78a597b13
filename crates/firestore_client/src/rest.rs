//! REST client for Firestore documents.
//!
//! Covers: listing document ids in a collection, create-or-replace by id.

use common::config::StoreConfig;
use common::Error;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::auth::{ServiceAccount, TokenSource};
use crate::value::{document_id, to_fields};

const LIST_PAGE_SIZE: u32 = 300;

/// Async Firestore client bound to one project's default database.
#[derive(Debug)]
pub struct FirestoreClient {
    client: reqwest::Client,
    tokens: TokenSource,
    base_url: String,
    project_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<DocumentName>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentName {
    name: String,
}

impl FirestoreClient {
    pub fn new(account: &ServiceAccount, cfg: &StoreConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("recipe-harvester/0.1")
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build Firestore HTTP client: {e}")))?;

        let tokens = TokenSource::new(account, client.clone())?;

        Ok(Self {
            client,
            tokens,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            project_id: account.project_id.clone(),
        })
    }

    /// URL helper.
    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection
        )
    }

    /// List the ids of every document in `collection`, following page tokens.
    pub async fn list_document_ids(&self, collection: &str) -> Result<Vec<String>, Error> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.tokens.access_token().await?;
            let page_size = LIST_PAGE_SIZE.to_string();

            let mut req = self
                .client
                .get(self.collection_url(collection))
                .bearer_auth(token)
                .query(&[("pageSize", page_size.as_str()), ("mask.fieldPaths", "__name__")]);
            if let Some(ref t) = page_token {
                req = req.query(&[("pageToken", t.as_str())]);
            }

            let resp = req.send().await.map_err(|e| Error::Http(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::Store {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let page: ListDocumentsResponse =
                resp.json().await.map_err(|e| Error::Http(e.to_string()))?;

            let count = page.documents.len();
            ids.extend(page.documents.iter().map(|d| document_id(&d.name).to_string()));
            debug!("Listed {} documents in {} (total: {})", count, collection, ids.len());

            match page.next_page_token {
                Some(t) if !t.is_empty() => page_token = Some(t),
                _ => break,
            }
        }

        Ok(ids)
    }

    /// Create or fully replace the document `collection/id`.
    ///
    /// A PATCH without an update mask replaces every field, so this is
    /// idempotent for a given id and payload.
    pub async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<(), Error> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}", self.collection_url(collection), id);
        let body = json!({ "fields": to_fields(data) });

        debug!("Writing document {}/{}", collection, id);

        let resp = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Store {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }
}
