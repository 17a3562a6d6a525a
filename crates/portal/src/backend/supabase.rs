//! Supabase REST client.
//!
//! Implements [`RecordStore`] over `PostgREST` (`/rest/v1`) and
//! [`IdentityProvider`] over `GoTrue` (`/auth/v1`). Every request carries the
//! project's anon key; once a user session exists its access token replaces
//! the anon bearer so row-level security sees the user.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::{RwLock, broadcast};
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use sol_city_core::records::Identity;
use sol_city_core::types::UserId;

use super::{
    AUTH_EVENT_CAPACITY, AuthEvent, BackendError, Direction, IdentityProvider, Query, RecordStore,
    Session, Subscription, Table,
};
use crate::config::SupabaseConfig;

/// Supabase client. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// User object returned by `GET /auth/v1/user`.
#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

/// OAuth profile fields copied from the provider.
#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    full_name: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
}

impl From<AuthUser> for Identity {
    fn from(user: AuthUser) -> Self {
        let UserMetadata {
            full_name,
            name,
            avatar_url,
        } = user.user_metadata;
        Self::new(UserId::new(user.id), full_name.or(name), user.email, avatar_url)
    }
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret())
                .map_err(|e| BackendError::InvalidRequest(format!("Invalid anon key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                base_url: config.url.clone(),
                anon_key: config.anon_key.clone(),
                session: RwLock::new(None),
                events,
            }),
        })
    }

    /// Complete an OAuth sign-in with the access token from the redirect.
    ///
    /// Fetches the user, stores the session and notifies subscribers.
    ///
    /// # Errors
    ///
    /// Returns error if the token is rejected or the user cannot be fetched.
    #[instrument(skip(self, access_token))]
    pub async fn complete_sign_in(&self, access_token: SecretString) -> Result<Session, BackendError> {
        let identity = self
            .fetch_user(&access_token)
            .await?
            .ok_or_else(|| BackendError::Api {
                status: 401,
                message: "access token rejected".to_string(),
            })?;

        let session = Session {
            identity,
            access_token,
        };
        *self.inner.session.write().await = Some(session.clone());
        let _ = self.inner.events.send(AuthEvent::SignedIn(session.clone()));

        tracing::info!(user_id = %session.identity.id, "Signed in");
        Ok(session)
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| BackendError::InvalidRequest(format!("{path}: {e}")))
    }

    fn table_url(&self, table: Table) -> Result<Url, BackendError> {
        self.endpoint(&format!("rest/v1/{table}"))
    }

    /// Bearer token for data requests: the user's if signed in, else the anon key.
    async fn bearer(&self) -> String {
        self.inner.session.read().await.as_ref().map_or_else(
            || self.inner.anon_key.expose_secret().to_string(),
            |s| s.access_token.expose_secret().to_string(),
        )
    }

    /// Fetch the user for `token`; `None` if the token is not accepted.
    async fn fetch_user(&self, token: &SecretString) -> Result<Option<Identity>, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(Some(user.into()))
    }
}

/// Turn a non-success response into `BackendError::Api`.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Append `PostgREST` query parameters for `query`.
fn apply_query(url: &mut Url, query: &Query) {
    let mut pairs = url.query_pairs_mut();
    pairs.append_pair("select", "*");
    for filter in &query.filters {
        pairs.append_pair(filter.column, &format!("eq.{}", filter.value));
    }
    if let Some(order) = &query.order {
        let direction = match order.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        pairs.append_pair("order", &format!("{}.{direction}", order.column));
    }
    if let Some(limit) = query.limit {
        pairs.append_pair("limit", &limit.to_string());
    }
}

fn by_id(url: &mut Url, id: Uuid) {
    url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
}

#[async_trait]
impl RecordStore for SupabaseClient {
    #[instrument(skip(self, query), fields(table = %table))]
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<serde_json::Value>, BackendError> {
        let mut url = self.table_url(table)?;
        apply_query(&mut url, query);

        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;

        check(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    #[instrument(skip(self, row), fields(table = %table))]
    async fn insert(&self, table: Table, row: serde_json::Value) -> Result<(), BackendError> {
        let url = self.table_url(table)?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.bearer().await)
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, patch), fields(table = %table))]
    async fn update(&self, table: Table, id: Uuid, patch: serde_json::Value) -> Result<(), BackendError> {
        let mut url = self.table_url(table)?;
        by_id(&mut url, id);
        let response = self
            .inner
            .client
            .patch(url)
            .bearer_auth(self.bearer().await)
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(table = %table))]
    async fn delete(&self, table: Table, id: Uuid) -> Result<(), BackendError> {
        let mut url = self.table_url(table)?;
        by_id(&mut url, id);
        let response = self
            .inner
            .client
            .delete(url)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    fn subscribe(&self) -> Subscription {
        Subscription::new(self.inner.events.subscribe())
    }

    #[instrument(skip(self))]
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        let Some(session) = self.inner.session.read().await.clone() else {
            return Ok(None);
        };

        match self.fetch_user(&session.access_token).await? {
            Some(identity) => Ok(Some(Session {
                identity,
                access_token: session.access_token,
            })),
            None => {
                // Token expired or revoked
                *self.inner.session.write().await = None;
                let _ = self.inner.events.send(AuthEvent::SignedOut);
                Ok(None)
            }
        }
    }

    async fn sign_in_with_provider(&self, provider: &str, redirect_to: &str) -> Result<Url, BackendError> {
        let mut url = self.endpoint("auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), BackendError> {
        let previous = self.inner.session.write().await.take();

        // Local sign-out stands even if the server cannot be told
        if let Some(session) = previous
            && let Err(e) = self.revoke(&session.access_token).await
        {
            tracing::warn!(error = %e, "Remote sign-out failed");
        }

        let _ = self.inner.events.send(AuthEvent::SignedOut);
        Ok(())
    }
}

impl SupabaseClient {
    async fn revoke(&self, access_token: &SecretString) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;
        check(response).await.map(drop)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: Url::parse("https://solcity.supabase.co").unwrap(),
            anon_key: SecretString::from("anon-key"),
            access_token: None,
        })
        .unwrap()
    }

    #[test]
    fn test_select_query_string() {
        let mut url = Url::parse("https://solcity.supabase.co/rest/v1/reviews").unwrap();
        let query = Query::new()
            .eq("business_id", "b1")
            .order_by("created_at", Direction::Descending)
            .limit(Some(20));
        apply_query(&mut url, &query);

        assert_eq!(
            url.query(),
            Some("select=*&business_id=eq.b1&order=created_at.desc&limit=20")
        );
    }

    #[test]
    fn test_table_url() {
        let url = client().table_url(Table::NewsPosts).unwrap();
        assert_eq!(url.as_str(), "https://solcity.supabase.co/rest/v1/news_posts");
    }

    #[tokio::test]
    async fn test_sign_in_url() {
        let url = client()
            .sign_in_with_provider("discord", "http://localhost:8080/")
            .await
            .unwrap();
        assert_eq!(url.path(), "/auth/v1/authorize");
        assert_eq!(
            url.query(),
            Some("provider=discord&redirect_to=http%3A%2F%2Flocalhost%3A8080%2F")
        );
    }

    #[tokio::test]
    async fn test_no_session_without_sign_in() {
        assert!(client().current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_without_session_notifies() {
        let client = client();
        let mut subscription = client.subscribe();
        client.sign_out().await.unwrap();
        assert!(matches!(subscription.recv().await, Some(AuthEvent::SignedOut)));
    }

    #[tokio::test]
    async fn test_sign_out_notifies_when_server_unreachable() {
        let client = SupabaseClient::new(&SupabaseConfig {
            url: Url::parse("http://127.0.0.1:1/").unwrap(),
            anon_key: SecretString::from("anon-key"),
            access_token: None,
        })
        .unwrap();
        let user = Identity::new(UserId::random(), Some("Rita".to_string()), None, None);
        *client.inner.session.write().await = Some(Session {
            identity: user,
            access_token: SecretString::from("user-token"),
        });
        let mut subscription = client.subscribe();

        client.sign_out().await.unwrap();

        assert!(client.inner.session.read().await.is_none());
        assert!(matches!(subscription.recv().await, Some(AuthEvent::SignedOut)));
        assert_eq!(client.bearer().await, "anon-key");
    }

    #[test]
    fn test_identity_from_auth_user() {
        let user: AuthUser = serde_json::from_value(serde_json::json!({
            "id": "7f1c2a9e-31b4-4c55-9b7e-0d2f6a8c1e11",
            "email": "frank@example.org",
            "user_metadata": { "full_name": "Frank Williams", "avatar_url": "https://cdn/a.png" }
        }))
        .unwrap();
        let identity = Identity::from(user);
        assert_eq!(identity.display_name, "Frank Williams");
        assert_eq!(identity.avatar_url.as_deref(), Some("https://cdn/a.png"));
    }
}
