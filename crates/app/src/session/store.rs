//! Session store.
//!
//! Holds the current identity, mediates login/logout/registration against
//! the identity provider and classifies privilege. One store per running
//! client; it is owned by the [`crate::context::AppContext`] and injected
//! where needed, never an ambient singleton.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::{
    backend::IdentityProvider,
    session::{CredentialError, Identity, ProfileUpdate, Session},
};

/// The session/identity container.
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<Session>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates the store in its resolving state (`loading = true`).
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            state: watch::channel(Session::resolving()).0,
        }
    }

    /// Performs the initial session resolution.
    ///
    /// Adopts whatever identity the provider currently observes (or none)
    /// and clears the loading flag. Infallible by design: an observation
    /// problem degrades to an anonymous session, never a crash, and
    /// `loading` always ends up false so route gating can proceed.
    pub fn resolve(&self) {
        let identity = self.provider.observe().borrow().clone();

        self.state.send_replace(Session {
            identity,
            loading: false,
        });
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`CredentialError`] unchanged; the local
    /// session is only touched on success.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, CredentialError> {
        let identity = self
            .provider
            .register(email, password, display_name)
            .await?;

        self.adopt(identity.clone());

        Ok(identity)
    }

    /// Authenticates an existing account.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`CredentialError`] unchanged. Callers are
    /// expected to disable concurrent submission; the store itself issues
    /// exactly one provider call per invocation and holds no lock across
    /// it.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        let identity = self.provider.login(email, password).await?;

        self.adopt(identity.clone());

        Ok(identity)
    }

    /// Signs out unconditionally.
    ///
    /// The local identity is always cleared, even when the provider is
    /// unreachable; a provider failure is logged and swallowed.
    pub async fn logout(&self) {
        if let Err(error) = self.provider.logout().await {
            warn!(%error, "provider sign-out failed; clearing local session anyway");
        }

        self.state.send_modify(|session| session.identity = None);
    }

    /// Updates profile fields of the current identity, remote-first: the
    /// local identity changes only after the provider confirms the write.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`CredentialError`]; on failure the local
    /// identity is left exactly as it was.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Identity, CredentialError> {
        let identity = self.provider.update_profile(update).await?;

        self.adopt(identity.clone());

        Ok(identity)
    }

    /// A snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// The current identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    /// Whether the current session is privileged.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state
            .borrow()
            .identity
            .as_ref()
            .is_some_and(Identity::is_admin)
    }

    /// A live view of the session for route gating; fires on every
    /// change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn adopt(&self, identity: Identity) {
        self.state.send_replace(Session {
            identity: Some(identity),
            loading: false,
        });
    }
}
