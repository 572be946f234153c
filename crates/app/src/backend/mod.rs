//! Backend provider capability traits.
//!
//! The application consumes exactly one external collaborator, split into
//! three capability groups: identity, document store and blob store. The
//! [`firebase`] module talks to the real service over REST; the [`local`]
//! module is the in-memory, non-persistent fallback with the same call
//! signatures and error shapes, so the rest of the system never knows
//! which mode is active.

pub mod firebase;
pub mod local;

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

use crate::session::{CredentialError, Identity, ProfileUpdate};

pub use firebase::{FirebaseBackend, FirebaseConfig};
pub use local::{LocalBackend, SeedError};

/// The named document collections the catalog mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Menu items.
    Menus,
    /// Promotional banners.
    Promos,
    /// Menu categories.
    Categories,
}

impl Collection {
    /// Every collection, in mirror order.
    pub const ALL: [Self; 3] = [Self::Menus, Self::Promos, Self::Categories];

    /// The collection's name on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menus => "menus",
            Self::Promos => "promos",
            Self::Categories => "categories",
        }
    }
}

/// One stored record with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: String,

    /// The record's fields, without the id.
    pub data: Value,
}

/// A catalog mutation failed; always recoverable by retry.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The addressed document does not exist.
    #[error("document not found")]
    NotFound,

    /// The store refused the write.
    #[error("backend rejected the write: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("http error")]
    Transport(#[from] reqwest::Error),
}

/// A blob store operation failed.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The store refused the upload.
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("http error")]
    Transport(#[from] reqwest::Error),
}

/// Identity capability: accounts and the observed current identity.
#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account and signs it in.
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, CredentialError>;

    /// Authenticates an existing account.
    async fn login(&self, email: &str, password: &str) -> Result<Identity, CredentialError>;

    /// Signs the current identity out.
    async fn logout(&self) -> Result<(), CredentialError>;

    /// Updates profile fields of the current identity.
    async fn update_profile(&self, update: ProfileUpdate) -> Result<Identity, CredentialError>;

    /// Push-based view of the current identity; fires on every change,
    /// including to "none".
    fn observe(&self) -> watch::Receiver<Option<Identity>>;
}

/// Document store capability: per-collection CRUD plus full-snapshot
/// change subscriptions (replace-all-on-notify, never an incremental
/// patch).
#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a record, returning the generated id.
    async fn create(&self, collection: Collection, data: Value) -> Result<String, WriteError>;

    /// Replaces the fields of an existing record.
    async fn update(&self, collection: Collection, id: &str, data: Value)
    -> Result<(), WriteError>;

    /// Deletes a record; deleting an absent record is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), WriteError>;

    /// Subscribes to full snapshots of the collection. The stream lives
    /// for the life of the store and delivers the complete record set on
    /// every change.
    fn subscribe(&self, collection: Collection) -> watch::Receiver<Vec<Document>>;
}

/// Blob store capability: bytes in, public URL out.
#[automock]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores bytes under `path` and returns a publicly fetchable URL.
    async fn store(&self, bytes: &[u8], path: &str) -> Result<String, UploadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_match_the_wire_format() {
        assert_eq!(Collection::Menus.as_str(), "menus");
        assert_eq!(Collection::Promos.as_str(), "promos");
        assert_eq!(Collection::Categories.as_str(), "categories");
    }
}
