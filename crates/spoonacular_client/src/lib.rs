//! Spoonacular recipe API client.
//!
//! Pulls one batch of random recipes per call from `/recipes/random`.
//! Network failures and non-2xx statuses are not errors here: they are
//! logged and produce an empty batch. A 2xx body without a `recipes` array
//! is a fatal `Error::SourceSchema`. Records come back raw; decoding each
//! one is the caller's business.

use common::config::SourceConfig;
use common::{Error, RandomRecipesResponse};
use serde_json::Value;
use tracing::{debug, error};

const RANDOM_PATH: &str = "/recipes/random";

/// Spoonacular API client.
#[derive(Clone)]
pub struct SpoonacularClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    batch_size: u32,
}

impl std::fmt::Debug for SpoonacularClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpoonacularClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl SpoonacularClient {
    pub fn new(api_key: String, cfg: &SourceConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("recipe-harvester/0.1")
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build Spoonacular HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            batch_size: cfg.batch_size,
        })
    }

    /// Fetch one batch of random recipes.
    ///
    /// Returns `Ok(vec![])` when the request or the body read fails, or the
    /// API answers with a non-success status.
    pub async fn fetch_batch(&self) -> Result<Vec<Value>, Error> {
        let url = format!("{}{}", self.base_url, RANDOM_PATH);
        debug!("Fetching {} random recipes: {}", self.batch_size, url);

        let number = self.batch_size.to_string();
        let resp = match self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str()), ("number", number.as_str())])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                // reqwest errors carry the full URL, which includes the key.
                error!("An error occurred while fetching recipes: {}", e.without_url());
                return Ok(Vec::new());
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                "An error occurred while fetching recipes: Spoonacular returned {}: {}",
                status.as_u16(),
                body.chars().take(500).collect::<String>()
            );
            return Ok(Vec::new());
        }

        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(e) => {
                error!("An error occurred while fetching recipes: {}", e.without_url());
                return Ok(Vec::new());
            }
        };

        let data = decode_batch(&body)?;
        debug!("Got {} recipes from Spoonacular", data.len());
        Ok(data)
    }
}

/// Decode a `/recipes/random` response body into its raw records.
pub fn decode_batch(body: &[u8]) -> Result<Vec<Value>, Error> {
    let parsed: RandomRecipesResponse =
        serde_json::from_slice(body).map_err(|e| Error::SourceSchema(e.to_string()))?;
    Ok(parsed.recipes)
}
