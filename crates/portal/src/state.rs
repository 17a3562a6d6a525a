//! Shared handles to the configured collaborators.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::backend::supabase::SupabaseClient;
use crate::backend::{IdentityProvider, RecordStore};
use crate::config::PortalConfig;
use crate::error::Result;
use crate::roles::RoleResolver;
use crate::session::SessionStore;
use crate::storage::{DurableStorage, FileStorage};

const DEFAULT_OAUTH_PROVIDER: &str = "discord";
const DEFAULT_REDIRECT_URL: &str = "http://localhost:8080/";

/// Portal state shared by all pages.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct PortalState {
    inner: Arc<PortalStateInner>,
}

struct PortalStateInner {
    records: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityProvider>,
    storage: Arc<dyn DurableStorage>,
    session_timeout: Option<Duration>,
    oauth_provider: String,
    redirect_url: String,
}

impl std::fmt::Debug for PortalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalState")
            .field("session_timeout", &self.inner.session_timeout)
            .field("oauth_provider", &self.inner.oauth_provider)
            .finish_non_exhaustive()
    }
}

impl PortalState {
    /// Connect to the configured Supabase project.
    ///
    /// If the configuration carries an access token the sign-in is
    /// completed, so the session store starts signed in.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be built or the token is rejected.
    pub async fn connect(config: &PortalConfig) -> Result<Self> {
        let client = SupabaseClient::new(&config.supabase)?;
        if let Some(token) = &config.supabase.access_token {
            client.complete_sign_in(token.clone()).await?;
        }

        let client = Arc::new(client);
        Ok(Self::from_parts(
            client.clone(),
            client,
            Arc::new(FileStorage::new(&config.storage_path)),
            config.session_timeout,
        )
        .with_oauth(&config.oauth_provider, config.redirect_url.as_str()))
    }

    /// Assemble state from explicit collaborators.
    #[must_use]
    pub fn from_parts(
        records: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn DurableStorage>,
        session_timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(PortalStateInner {
                records,
                identity,
                storage,
                session_timeout,
                oauth_provider: DEFAULT_OAUTH_PROVIDER.to_string(),
                redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            }),
        }
    }

    /// Set the OAuth provider and redirect target used by [`Self::sign_in_url`].
    #[must_use]
    pub fn with_oauth(self, provider: &str, redirect_url: &str) -> Self {
        let inner = &self.inner;
        Self {
            inner: Arc::new(PortalStateInner {
                records: inner.records.clone(),
                identity: inner.identity.clone(),
                storage: inner.storage.clone(),
                session_timeout: inner.session_timeout,
                oauth_provider: provider.to_string(),
                redirect_url: redirect_url.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn records(&self) -> Arc<dyn RecordStore> {
        self.inner.records.clone()
    }

    #[must_use]
    pub fn identity(&self) -> Arc<dyn IdentityProvider> {
        self.inner.identity.clone()
    }

    #[must_use]
    pub fn storage(&self) -> Arc<dyn DurableStorage> {
        self.inner.storage.clone()
    }

    #[must_use]
    pub fn roles(&self) -> RoleResolver {
        RoleResolver::new(self.records())
    }

    /// Start a session store against the identity provider.
    #[must_use]
    pub fn start_session(&self) -> SessionStore {
        SessionStore::start(self.identity(), self.inner.session_timeout)
    }

    /// URL that starts the OAuth sign-in.
    ///
    /// # Errors
    ///
    /// Returns error if the provider refuses to start the flow.
    pub async fn sign_in_url(&self) -> Result<Url> {
        let url = self
            .inner
            .identity
            .sign_in_with_provider(&self.inner.oauth_provider, &self.inner.redirect_url)
            .await?;
        tracing::info!(provider = %self.inner.oauth_provider, "Sign-in started");
        Ok(url)
    }

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns error if the provider fails to sign out.
    pub async fn sign_out(&self) -> Result<()> {
        self.inner.identity.sign_out().await?;
        tracing::info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::memory::{MemoryIdentityProvider, MemoryRecordStore};
    use crate::storage::MemoryStorage;

    fn state(provider: Arc<MemoryIdentityProvider>) -> PortalState {
        PortalState::from_parts(
            Arc::new(MemoryRecordStore::new()),
            provider,
            Arc::new(MemoryStorage::new()),
            None,
        )
    }

    #[tokio::test]
    async fn test_sign_in_url_uses_configured_provider() {
        let provider = Arc::new(MemoryIdentityProvider::new());
        let state = state(provider.clone()).with_oauth("discord", "https://solcity.example/");

        let url = state.sign_in_url().await.unwrap();
        assert_eq!(url.query_pairs().count(), 2);
        assert_eq!(
            provider.sign_in_requests().await,
            [("discord".to_string(), "https://solcity.example/".to_string())]
        );
    }

    #[tokio::test]
    async fn test_sign_out_reaches_session_store() {
        let provider = Arc::new(MemoryIdentityProvider::new());
        let state = state(provider.clone());
        let session = state.start_session();
        let _ = session.ready().await;

        provider
            .sign_in(sol_city_core::records::Identity::new(
                sol_city_core::types::UserId::random(),
                Some("Frank".to_string()),
                None,
                None,
            ))
            .await;
        let mut changes = session.watch();
        changes.changed().await.unwrap();
        assert!(session.identity().is_some());

        state.sign_out().await.unwrap();
        changes.changed().await.unwrap();
        assert!(session.identity().is_none());
    }
}
