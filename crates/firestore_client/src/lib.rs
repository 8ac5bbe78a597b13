//! Firestore REST client.
//!
//! Authenticates with a Google service account (signed JWT exchanged for an
//! OAuth access token) and exposes the two document operations the harvester
//! needs: listing the ids of a collection and replacing a document.

pub mod auth;
pub mod rest;
pub mod value;

pub use auth::{ServiceAccount, TokenSource};
pub use rest::FirestoreClient;
