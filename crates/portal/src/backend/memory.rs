//! In-process backend doubles.
//!
//! [`MemoryRecordStore`] keeps tables as JSON rows and logs every call so
//! tests can assert exactly which requests a workflow issued (or that it
//! issued none). [`MemoryIdentityProvider`] lets tests push auth events and
//! control how the session snapshot resolves.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, broadcast};
use url::Url;
use uuid::Uuid;

use sol_city_core::records::Identity;

use super::{
    AUTH_EVENT_CAPACITY, AuthEvent, BackendError, Direction, IdentityProvider, Query, RecordStore,
    Session, Subscription, Table,
};

/// Record store operation, for call logs and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

/// One logged call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub table: Table,
}

/// Table storage in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashSet<(Operation, Table)>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put rows directly into `table` without logging a call.
    ///
    /// # Errors
    ///
    /// Returns error if a row does not serialize to JSON.
    pub async fn seed<T: Serialize>(&self, table: Table, rows: &[T]) -> Result<(), BackendError> {
        let rows = rows
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.tables.lock().await.entry(table).or_default().extend(rows);
        Ok(())
    }

    /// Current rows of `table`, in insertion order, without logging a call.
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables.lock().await.get(&table).cloned().unwrap_or_default()
    }

    /// Every call received so far.
    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    /// Number of calls received so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Number of calls of `operation` against `table`.
    pub async fn count(&self, operation: Operation, table: Table) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.operation == operation && c.table == table)
            .count()
    }

    /// Make `operation` on `table` fail until [`MemoryRecordStore::recover`].
    pub async fn fail(&self, operation: Operation, table: Table) {
        self.failures.lock().await.insert((operation, table));
    }

    pub async fn recover(&self, operation: Operation, table: Table) {
        self.failures.lock().await.remove(&(operation, table));
    }

    /// Log the call, then fail it if requested.
    async fn record(&self, operation: Operation, table: Table) -> Result<(), BackendError> {
        self.calls.lock().await.push(Call { operation, table });
        if self.failures.lock().await.contains(&(operation, table)) {
            return Err(BackendError::Api {
                status: 503,
                message: format!("{table} unavailable"),
            });
        }
        Ok(())
    }
}

/// Text form of a column value as compared by equality filters.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (a.parse::<DateTime<Utc>>(), b.parse::<DateTime<Utc>>()) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        // Nulls and missing columns sort last
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, BackendError> {
        self.record(Operation::Select, table).await?;

        let mut rows: Vec<Value> = self
            .rows(table)
            .await
            .into_iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|f| row.get(f.column).is_some_and(|v| render(v) == f.value))
            })
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(order.column), b.get(order.column));
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, mut row: Value) -> Result<(), BackendError> {
        self.record(Operation::Insert, table).await?;

        let Some(object) = row.as_object_mut() else {
            return Err(BackendError::Api {
                status: 400,
                message: "row must be a JSON object".to_string(),
            });
        };
        let now = serde_json::to_value(Utc::now())?;
        object
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        object.entry("created_at").or_insert_with(|| now.clone());
        object.entry("updated_at").or_insert(now);

        self.tables.lock().await.entry(table).or_default().push(row);
        Ok(())
    }

    async fn update(&self, table: Table, id: Uuid, patch: Value) -> Result<(), BackendError> {
        self.record(Operation::Update, table).await?;

        let Value::Object(patch) = patch else {
            return Err(BackendError::Api {
                status: 400,
                message: "patch must be a JSON object".to_string(),
            });
        };
        let id = id.to_string();
        let now = serde_json::to_value(Utc::now())?;

        let mut tables = self.tables.lock().await;
        // Matching zero rows is not an error, as with PostgREST
        for row in tables.entry(table).or_default() {
            if row_id(row) == Some(id.as_str())
                && let Some(object) = row.as_object_mut()
            {
                object.extend(patch.clone());
                object.insert("updated_at".to_string(), now.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), BackendError> {
        self.record(Operation::Delete, table).await?;

        let id = id.to_string();
        self.tables
            .lock()
            .await
            .entry(table)
            .or_default()
            .retain(|row| row_id(row) != Some(id.as_str()));
        Ok(())
    }
}

// =============================================================================
// Identity provider
// =============================================================================

/// Identity provider double.
///
/// The session snapshot is taken when [`IdentityProvider::current_session`]
/// is called and returned after the configured delay, so a slow snapshot
/// can arrive after newer push events.
#[derive(Debug)]
pub struct MemoryIdentityProvider {
    events: broadcast::Sender<AuthEvent>,
    session: Mutex<Option<Session>>,
    snapshot_delay: Mutex<Duration>,
    snapshot_unreachable: Mutex<bool>,
    sign_in_requests: Mutex<Vec<(String, String)>>,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            events,
            session: Mutex::new(None),
            snapshot_delay: Mutex::new(Duration::ZERO),
            snapshot_unreachable: Mutex::new(false),
            sign_in_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for `identity` with a dummy token.
    #[must_use]
    pub fn session_for(identity: Identity) -> Session {
        Session {
            access_token: format!("token-{}", identity.id).into(),
            identity,
        }
    }

    /// Set the session without notifying subscribers.
    pub async fn set_session(&self, session: Option<Session>) {
        *self.session.lock().await = session;
    }

    /// Sign `identity` in and push `SignedIn`.
    pub async fn sign_in(&self, identity: Identity) {
        let session = Self::session_for(identity);
        *self.session.lock().await = Some(session.clone());
        let _ = self.events.send(AuthEvent::SignedIn(session));
    }

    /// Push an arbitrary event without touching the stored session.
    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    /// Delay every snapshot by `delay`.
    pub async fn set_snapshot_delay(&self, delay: Duration) {
        *self.snapshot_delay.lock().await = delay;
    }

    /// Make the snapshot hang forever, like an unreachable provider.
    pub async fn set_unreachable(&self, unreachable: bool) {
        *self.snapshot_unreachable.lock().await = unreachable;
    }

    /// Live push-channel registrations.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// `(provider, redirect_to)` of every sign-in started.
    pub async fn sign_in_requests(&self) -> Vec<(String, String)> {
        self.sign_in_requests.lock().await.clone()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    fn subscribe(&self) -> Subscription {
        Subscription::new(self.events.subscribe())
    }

    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        let snapshot = self.session.lock().await.clone();
        if *self.snapshot_unreachable.lock().await {
            std::future::pending::<()>().await;
        }
        let delay = *self.snapshot_delay.lock().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(snapshot)
    }

    async fn sign_in_with_provider(&self, provider: &str, redirect_to: &str) -> Result<Url, BackendError> {
        self.sign_in_requests
            .lock()
            .await
            .push((provider.to_string(), redirect_to.to_string()));

        let mut url = Url::parse("https://identity.test/authorize")
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        *self.session.lock().await = None;
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_select_filters_orders_and_limits() {
        let store = MemoryRecordStore::new();
        store
            .seed(
                Table::Events,
                &[
                    json!({"id": "a", "title": "Fair", "event_date": "2025-07-04T12:00:00Z"}),
                    json!({"id": "b", "title": "Parade", "event_date": "2025-06-01T09:00:00Z"}),
                    json!({"id": "c", "title": "Fair", "event_date": "2025-05-01T09:00:00.5Z"}),
                ],
            )
            .await
            .unwrap();

        let rows = store
            .select(
                Table::Events,
                &Query::new().order_by("event_date", Direction::Ascending),
            )
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().filter_map(row_id).collect();
        assert_eq!(ids, ["c", "b", "a"]);

        let rows = store
            .select(Table::Events, &Query::new().eq("title", "Fair").limit(Some(1)))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(store.count(Operation::Select, Table::Events).await, 2);
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = MemoryRecordStore::new();
        store.insert(Table::NewsPosts, json!({"title": "Fair"})).await.unwrap();

        let rows = store.rows(Table::NewsPosts).await;
        assert!(rows[0].get("id").and_then(Value::as_str).is_some());
        assert!(rows[0].get("created_at").is_some());
    }

    #[tokio::test]
    async fn test_update_and_delete_by_id() {
        let store = MemoryRecordStore::new();
        let id = Uuid::new_v4();
        store
            .seed(Table::Businesses, &[json!({"id": id.to_string(), "name": "Old"})])
            .await
            .unwrap();

        store.update(Table::Businesses, id, json!({"name": "New"})).await.unwrap();
        assert_eq!(store.rows(Table::Businesses).await[0]["name"], "New");

        store.delete(Table::Businesses, id).await.unwrap();
        assert!(store.rows(Table::Businesses).await.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_is_logged() {
        let store = MemoryRecordStore::new();
        store.fail(Operation::Delete, Table::Events).await;

        let err = store.delete(Table::Events, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 503, .. }));
        assert_eq!(store.call_count().await, 1);

        store.recover(Operation::Delete, Table::Events).await;
        assert!(store.delete(Table::Events, Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscription_drop_unsubscribes() {
        let provider = MemoryIdentityProvider::new();
        let subscription = provider.subscribe();
        assert_eq!(provider.subscriber_count(), 1);
        drop(subscription);
        assert_eq!(provider.subscriber_count(), 0);
    }
}
