//! Boundary to the hosted backend-as-a-service.
//!
//! Two collaborators are consumed:
//!
//! - [`IdentityProvider`] - OAuth sign-in, session snapshot and a push
//!   channel of auth state changes
//! - [`RecordStore`] - table-oriented select/insert/update/delete, with
//!   row-level security enforced server-side
//!
//! [`supabase::SupabaseClient`] implements both over the Supabase REST APIs;
//! [`memory`] provides in-process doubles for tests.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::broadcast;
use url::Url;
use uuid::Uuid;

use sol_city_core::records::Identity;

/// Errors returned by backend adapters.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response (constraint or RLS violation, ...).
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request could not be built (bad URL or header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

// =============================================================================
// Record store
// =============================================================================

/// Tables the portal reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Businesses,
    Reviews,
    Events,
    NewsPosts,
    Profiles,
    UserRoles,
    Properties,
}

impl Table {
    /// Table name in the backend schema.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Businesses => "businesses",
            Self::Reviews => "reviews",
            Self::Events => "events",
            Self::NewsPosts => "news_posts",
            Self::Profiles => "profiles",
            Self::UserRoles => "user_roles",
            Self::Properties => "properties",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering clause of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub direction: Direction,
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

/// Select parameters: equality filters ANDed together, optional ordering
/// and row limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows whose `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &'static str, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column,
            value: value.to_string(),
        });
        self
    }

    #[must_use]
    pub const fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order = Some(Order { column, direction });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// Table-oriented persistence.
///
/// Every mutation is a single request; the backend applies row-level
/// security and last-writer-wins semantics.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch rows matching `query`.
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<serde_json::Value>, BackendError>;

    /// Insert one row.
    async fn insert(&self, table: Table, row: serde_json::Value) -> Result<(), BackendError>;

    /// Apply `patch` to the row with primary key `id`.
    async fn update(&self, table: Table, id: Uuid, patch: serde_json::Value) -> Result<(), BackendError>;

    /// Delete the row with primary key `id`.
    async fn delete(&self, table: Table, id: Uuid) -> Result<(), BackendError>;
}

/// Select rows and deserialize them into `T`.
///
/// # Errors
///
/// Returns the store's error, or `BackendError::Parse` for rows that do not
/// match `T`.
pub async fn select_rows<T: DeserializeOwned>(
    store: &dyn RecordStore,
    table: Table,
    query: &Query,
) -> Result<Vec<T>, BackendError> {
    store
        .select(table, query)
        .await?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| BackendError::Parse(format!("{table}: {e}"))))
        .collect()
}

/// Select at most one row by primary key.
///
/// # Errors
///
/// Same as [`select_rows`].
pub async fn select_by_id<T: DeserializeOwned>(
    store: &dyn RecordStore,
    table: Table,
    id: Uuid,
) -> Result<Option<T>, BackendError> {
    let query = Query::new().eq("id", id).limit(Some(1));
    Ok(select_rows(store, table, &query).await?.into_iter().next())
}

/// Serialize `row` and insert it.
///
/// # Errors
///
/// Returns the store's error.
pub async fn insert_row<T: Serialize + Sync>(
    store: &dyn RecordStore,
    table: Table,
    row: &T,
) -> Result<(), BackendError> {
    store.insert(table, serde_json::to_value(row)?).await
}

/// Serialize `patch` and apply it to the row with primary key `id`.
///
/// # Errors
///
/// Returns the store's error.
pub async fn update_row<T: Serialize + Sync>(
    store: &dyn RecordStore,
    table: Table,
    id: Uuid,
    patch: &T,
) -> Result<(), BackendError> {
    store.update(table, id, serde_json::to_value(patch)?).await
}

// =============================================================================
// Identity provider
// =============================================================================

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub access_token: SecretString,
}

/// Auth state change pushed by the provider.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

impl AuthEvent {
    /// Session after this event.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(s) | Self::TokenRefreshed(s) => Some(s),
            Self::SignedOut => None,
        }
    }
}

/// Capacity of the auth event channel.
pub(crate) const AUTH_EVENT_CAPACITY: usize = 16;

/// Registration on the provider's push channel.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl Subscription {
    pub(crate) const fn new(receiver: broadcast::Receiver<AuthEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the next event. Returns `None` once the provider is gone.
    ///
    /// If this subscriber fell behind, missed events are skipped and the
    /// newest one is delivered; only the latest state matters.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// External identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register for auth state change notifications.
    fn subscribe(&self) -> Subscription;

    /// Fetch the current session, if any.
    async fn current_session(&self) -> Result<Option<Session>, BackendError>;

    /// Start an OAuth sign-in with `provider` (e.g. `discord`), returning the
    /// URL the user must visit. The provider redirects back to `redirect_to`.
    async fn sign_in_with_provider(&self, provider: &str, redirect_to: &str) -> Result<Url, BackendError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), BackendError>;
}
