//! Unified error type for the recipe harvester.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Config error: {0}")]
    Config(String),

    /// The recipe source answered 2xx but the body is not the expected shape.
    #[error("Recipe source returned an unexpected payload: {0}")]
    SourceSchema(String),

    #[error("Document store error (status={status}): {message}")]
    Store { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
