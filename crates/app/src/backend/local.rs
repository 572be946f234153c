//! In-memory fallback backend.
//!
//! Serves the fixture catalog and a fixed allow-list of demo accounts when
//! no real backend is configured. Nothing here persists beyond the
//! process; it exists so the rest of the application can run unchanged in
//! demo mode.

use std::sync::RwLock;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use makanbar::fixtures::{self, FixtureError};

use crate::{
    backend::{BlobStore, Collection, Document, DocumentStore, IdentityProvider, WriteError},
    session::{CredentialError, Identity, ProfileUpdate},
};

use super::UploadError;

/// The demo allow-list: `(email, password, display name)`.
///
/// Unknown credentials are never promoted to a signed-in state.
const DEMO_ACCOUNTS: [(&str, &str, &str); 2] = [
    ("demo@makanbar.com", "demo123", "Demo User"),
    ("admin@makanbar.com", "admin123", "Admin MakanBar"),
];

/// Errors building the seeded fallback.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The embedded fixture data failed to parse.
    #[error("failed to load fixture data")]
    Fixture(#[from] FixtureError),

    /// A fixture record failed to encode as a document.
    #[error("failed to encode fixture record")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
struct Account {
    id: String,
    password: String,
    display_name: String,
}

/// The local, in-memory backend provider.
///
/// Implements all three capability traits behind the same signatures as
/// the remote backend. Collection snapshots go out on watch channels, so
/// a successful write is always followed by a full replace-all
/// notification and a failed write leaves the snapshot untouched.
#[derive(Debug)]
pub struct LocalBackend {
    accounts: RwLock<FxHashMap<String, Account>>,
    identity_tx: watch::Sender<Option<Identity>>,
    collections: FxHashMap<Collection, watch::Sender<Vec<Document>>>,
    blobs: RwLock<FxHashMap<String, Vec<u8>>>,
}

impl LocalBackend {
    /// Builds the fallback seeded with the fixture catalog and the demo
    /// account allow-list.
    ///
    /// # Errors
    ///
    /// Returns a [`SeedError`] if the embedded fixtures fail to load.
    pub fn seeded() -> Result<Self, SeedError> {
        let fixture = fixtures::load()?;

        let mut collections = FxHashMap::default();
        collections.insert(
            Collection::Menus,
            watch::channel(seed_documents(&fixture.menu_items)?).0,
        );
        collections.insert(
            Collection::Promos,
            watch::channel(seed_documents(&fixture.promotions)?).0,
        );
        collections.insert(
            Collection::Categories,
            watch::channel(seed_documents(&fixture.categories)?).0,
        );

        let mut accounts = FxHashMap::default();
        for (email, password, display_name) in DEMO_ACCOUNTS {
            accounts.insert(
                email.to_owned(),
                Account {
                    id: format!("local-{}", Uuid::now_v7()),
                    password: password.to_owned(),
                    display_name: display_name.to_owned(),
                },
            );
        }

        Ok(Self {
            accounts: RwLock::new(accounts),
            identity_tx: watch::channel(None).0,
            collections,
            blobs: RwLock::new(FxHashMap::default()),
        })
    }

    fn collection(&self, collection: Collection) -> &watch::Sender<Vec<Document>> {
        // The map is keyed by every `Collection` variant at construction.
        self.collections
            .get(&collection)
            .unwrap_or_else(|| unreachable!("collection {collection:?} not seeded"))
    }

    fn lock_poisoned() -> CredentialError {
        CredentialError::Unknown("account state lock poisoned".to_owned())
    }
}

#[async_trait]
impl IdentityProvider for LocalBackend {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, CredentialError> {
        if !email.contains('@') {
            return Err(CredentialError::InvalidEmail);
        }
        if password.len() < 6 {
            return Err(CredentialError::WeakPassword);
        }

        let identity = {
            let mut accounts = self.accounts.write().map_err(|_| Self::lock_poisoned())?;

            if accounts.contains_key(email) {
                return Err(CredentialError::EmailInUse);
            }

            let account = Account {
                id: format!("local-{}", Uuid::now_v7()),
                password: password.to_owned(),
                display_name: display_name.to_owned(),
            };
            let identity = Identity::new(&account.id, email, display_name);
            accounts.insert(email.to_owned(), account);

            identity
        };

        self.identity_tx.send_replace(Some(identity.clone()));

        Ok(identity)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        let identity = {
            let accounts = self.accounts.read().map_err(|_| Self::lock_poisoned())?;

            // The fallback deliberately reports one opaque failure for any
            // unrecognized pair instead of distinguishing unknown emails
            // from wrong passwords.
            let account = accounts
                .get(email)
                .filter(|account| account.password == password)
                .ok_or_else(|| {
                    CredentialError::Unknown("unrecognized demo credentials".to_owned())
                })?;

            Identity::new(&account.id, email, &account.display_name)
        };

        self.identity_tx.send_replace(Some(identity.clone()));

        Ok(identity)
    }

    async fn logout(&self) -> Result<(), CredentialError> {
        self.identity_tx.send_replace(None);

        Ok(())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<Identity, CredentialError> {
        let current = self
            .identity_tx
            .borrow()
            .clone()
            .ok_or(CredentialError::UserNotFound)?;

        let display_name = update.display_name.unwrap_or(current.display_name);

        {
            let mut accounts = self.accounts.write().map_err(|_| Self::lock_poisoned())?;
            if let Some(account) = accounts.get_mut(&current.email) {
                account.display_name.clone_from(&display_name);
            }
        }

        let identity = Identity::new(current.id, current.email, display_name);
        self.identity_tx.send_replace(Some(identity.clone()));

        Ok(identity)
    }

    fn observe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity_tx.subscribe()
    }
}

#[async_trait]
impl DocumentStore for LocalBackend {
    async fn create(&self, collection: Collection, data: Value) -> Result<String, WriteError> {
        let id = Uuid::now_v7().to_string();

        self.collection(collection).send_modify(|documents| {
            documents.push(Document {
                id: id.clone(),
                data,
            });
        });

        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> Result<(), WriteError> {
        let sender = self.collection(collection);

        // Validate before notifying so a rejected write never publishes a
        // snapshot.
        if !sender.borrow().iter().any(|document| document.id == id) {
            return Err(WriteError::NotFound);
        }

        sender.send_modify(|documents| {
            if let Some(document) = documents.iter_mut().find(|document| document.id == id) {
                document.data = data;
            }
        });

        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), WriteError> {
        self.collection(collection).send_modify(|documents| {
            documents.retain(|document| document.id != id);
        });

        Ok(())
    }

    fn subscribe(&self, collection: Collection) -> watch::Receiver<Vec<Document>> {
        self.collection(collection).subscribe()
    }
}

#[async_trait]
impl BlobStore for LocalBackend {
    async fn store(&self, bytes: &[u8], path: &str) -> Result<String, UploadError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| UploadError::Rejected("blob state lock poisoned".to_owned()))?;

        blobs.insert(path.to_owned(), bytes.to_vec());

        Ok(format!("local://{path}"))
    }
}

/// Encodes fixture records as documents, lifting the `id` field out of the
/// record body.
fn seed_documents<T: Serialize>(records: &[T]) -> Result<Vec<Document>, serde_json::Error> {
    records
        .iter()
        .map(|record| {
            let mut data = serde_json::to_value(record)?;

            let id = data
                .as_object_mut()
                .and_then(|fields| fields.remove("id"))
                .and_then(|id| id.as_str().map(ToOwned::to_owned))
                .unwrap_or_default();

            Ok(Document { id, data })
        })
        .collect()
}
