//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    backend::{
        BlobStore, DocumentStore, FirebaseBackend, FirebaseConfig, IdentityProvider, LocalBackend,
        SeedError,
    },
    catalog::CatalogStore,
    session::SessionStore,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to seed the local backend")]
    Seed(#[from] SeedError),
}

#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<SessionStore>,
    pub catalog: Arc<CatalogStore>,
}

impl AppContext {
    /// Build application context over an explicit backend triple.
    pub fn with_backend(
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            session: Arc::new(SessionStore::new(identity)),
            catalog: Arc::new(CatalogStore::new(documents, blobs)),
        }
    }

    /// Build application context on the in-memory backend, pre-seeded
    /// with the bundled menu.
    ///
    /// # Errors
    ///
    /// Returns an error when the bundled fixture data fails to load.
    pub fn local() -> Result<Self, AppInitError> {
        let backend = Arc::new(LocalBackend::seeded()?);

        Ok(Self::with_backend(
            backend.clone(),
            backend.clone(),
            backend,
        ))
    }

    /// Build application context from the environment: the Firebase
    /// backend when its configuration is complete, the local in-memory
    /// backend otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error when falling back to the local backend and its
    /// seed data fails to load.
    pub fn from_env() -> Result<Self, AppInitError> {
        match FirebaseConfig::from_env() {
            Some(config) => {
                let backend = Arc::new(FirebaseBackend::new(config));

                Ok(Self::with_backend(
                    backend.clone(),
                    backend.clone(),
                    backend,
                ))
            }
            None => Self::local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_context_wires_both_stores() {
        let context = AppContext::local().expect("bundled fixtures load");

        assert_eq!(context.catalog.menu_items().len(), 5);
        assert!(context.session.identity().is_none());
    }

    #[tokio::test]
    async fn login_through_the_context_reaches_the_shared_backend() {
        let context = AppContext::local().expect("bundled fixtures load");
        context.session.resolve();

        context
            .session
            .login("demo@makanbar.com", "demo123")
            .await
            .expect("demo credentials are allow-listed");

        assert!(context.session.identity().is_some());
    }
}
