//! Admin panel: news posts and events.
//!
//! The panel opens only for a loaded session whose identity holds an admin
//! role. It remembers the admin it was opened for; every action checks the
//! live session against that identity, so a sign-out or account switch
//! closes the panel without another role query.
//!
//! Create actions validate the form before anything is sent. Lists are
//! reloaded after each successful mutation and left untouched on failure.

use std::sync::Arc;

use tracing::instrument;

use sol_city_core::records::{Event, EventDraft, Identity, NewsDraft, NewsPost};
use sol_city_core::types::{EventId, NewsPostId};

use crate::backend::{BackendError, Direction, Query, RecordStore, Table, insert_row, select_rows};
use crate::error::{AuthorizationError, PortalError, Result};
use crate::pages::Completed;
use crate::roles::RoleResolver;
use crate::session::SessionState;

/// Check that `session` may open the admin panel and return the admin.
///
/// # Errors
///
/// `SessionLoading` while the session is unresolved,
/// `AuthenticationRequired` when signed out, `AccessDenied` without an admin
/// role, `Backend` if the role query fails.
pub async fn admin_gate(session: &SessionState, roles: &RoleResolver) -> Result<Identity> {
    if session.loading {
        return Err(AuthorizationError::SessionLoading.into());
    }
    let identity = session
        .identity
        .as_ref()
        .ok_or(AuthorizationError::AuthenticationRequired)?;
    if !roles.is_admin(Some(identity)).await? {
        tracing::warn!(user_id = %identity.id, "Admin panel denied");
        return Err(AuthorizationError::AccessDenied.into());
    }
    Ok(identity.clone())
}

/// Admin panel state.
pub struct AdminPanel {
    store: Arc<dyn RecordStore>,
    admin: Identity,
    limit: Option<usize>,
    news: Vec<NewsPost>,
    events: Vec<Event>,
    pub news_form: NewsDraft,
    pub event_form: EventDraft,
}

impl std::fmt::Debug for AdminPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminPanel")
            .field("admin", &self.admin.id)
            .field("news", &self.news.len())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl AdminPanel {
    /// Pass the gate and load both lists.
    ///
    /// `limit` caps each list; `None` loads everything. A list that fails
    /// to load is logged and shown empty.
    ///
    /// # Errors
    ///
    /// See [`admin_gate`].
    pub async fn open(
        store: Arc<dyn RecordStore>,
        roles: &RoleResolver,
        session: &SessionState,
        limit: Option<usize>,
    ) -> Result<Self> {
        let admin = admin_gate(session, roles).await?;
        tracing::info!(user_id = %admin.id, "Admin panel opened");

        let mut panel = Self {
            store,
            admin,
            limit,
            news: Vec::new(),
            events: Vec::new(),
            news_form: NewsDraft::default(),
            event_form: EventDraft::default(),
        };
        if let Err(e) = panel.refresh_news().await {
            PortalError::from(e).report();
        }
        if let Err(e) = panel.refresh_events().await {
            PortalError::from(e).report();
        }
        Ok(panel)
    }

    #[must_use]
    pub const fn admin(&self) -> &Identity {
        &self.admin
    }

    /// News posts, newest first.
    #[must_use]
    pub fn news(&self) -> &[NewsPost] {
        &self.news
    }

    /// Events, soonest first.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Reload news posts.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails; the current list is kept.
    pub async fn refresh_news(&mut self) -> std::result::Result<(), BackendError> {
        let query = Query::new()
            .order_by("created_at", Direction::Descending)
            .limit(self.limit);
        self.news = select_rows(self.store.as_ref(), Table::NewsPosts, &query).await?;
        Ok(())
    }

    /// Reload events.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails; the current list is kept.
    pub async fn refresh_events(&mut self) -> std::result::Result<(), BackendError> {
        let query = Query::new()
            .order_by("event_date", Direction::Ascending)
            .limit(self.limit);
        self.events = select_rows(self.store.as_ref(), Table::Events, &query).await?;
        Ok(())
    }

    /// Publish the news form.
    ///
    /// # Errors
    ///
    /// `Authorization` if `session` no longer belongs to this admin,
    /// `Validation` for a missing title or content (no request sent),
    /// `Backend` if the insert fails (form kept).
    #[instrument(skip(self, session), fields(admin = %self.admin.id))]
    pub async fn create_news(&mut self, session: &SessionState) -> Result<Completed> {
        self.authorize(session)?;
        let post = self.news_form.validate(self.admin.id)?;

        insert_row(self.store.as_ref(), Table::NewsPosts, &post).await?;
        tracing::info!(title = %post.title, "News post published");
        self.news_form = NewsDraft::default();

        Ok(Completed::after_refresh(self.refresh_news().await))
    }

    /// Create an event from the event form.
    ///
    /// # Errors
    ///
    /// `Authorization` if `session` no longer belongs to this admin,
    /// `Validation` for a missing title or unparseable date (no request
    /// sent), `Backend` if the insert fails (form kept).
    #[instrument(skip(self, session), fields(admin = %self.admin.id))]
    pub async fn create_event(&mut self, session: &SessionState) -> Result<Completed> {
        self.authorize(session)?;
        let event = self.event_form.validate(self.admin.id)?;

        insert_row(self.store.as_ref(), Table::Events, &event).await?;
        tracing::info!(title = %event.title, event_date = %event.event_date, "Event created");
        self.event_form = EventDraft::default();

        Ok(Completed::after_refresh(self.refresh_events().await))
    }

    /// Delete a news post immediately.
    ///
    /// # Errors
    ///
    /// `Authorization` if `session` no longer belongs to this admin,
    /// `Backend` if the delete fails (list unchanged).
    #[instrument(skip(self, session), fields(admin = %self.admin.id))]
    pub async fn delete_news(&mut self, id: NewsPostId, session: &SessionState) -> Result<Completed> {
        self.authorize(session)?;
        self.store.delete(Table::NewsPosts, id.as_uuid()).await?;
        tracing::info!("News post deleted");
        Ok(Completed::after_refresh(self.refresh_news().await))
    }

    /// Delete an event immediately.
    ///
    /// # Errors
    ///
    /// `Authorization` if `session` no longer belongs to this admin,
    /// `Backend` if the delete fails (list unchanged).
    #[instrument(skip(self, session), fields(admin = %self.admin.id))]
    pub async fn delete_event(&mut self, id: EventId, session: &SessionState) -> Result<Completed> {
        self.authorize(session)?;
        self.store.delete(Table::Events, id.as_uuid()).await?;
        tracing::info!("Event deleted");
        Ok(Completed::after_refresh(self.refresh_events().await))
    }

    fn authorize(&self, session: &SessionState) -> Result<()> {
        if session.loading {
            return Err(AuthorizationError::SessionLoading.into());
        }
        match session.user_id() {
            None => Err(AuthorizationError::AuthenticationRequired.into()),
            Some(id) if id != self.admin.id => Err(AuthorizationError::AccessDenied.into()),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::memory::{MemoryRecordStore, Operation};
    use chrono::Utc;
    use sol_city_core::records::RoleAssignment;
    use sol_city_core::types::{AppRole, RoleAssignmentId, UserId};

    async fn with_role(store: &MemoryRecordStore, role: AppRole) -> SessionState {
        let identity = Identity::new(UserId::random(), Some("Editor".to_string()), None, None);
        store
            .seed(
                Table::UserRoles,
                &[RoleAssignment {
                    id: RoleAssignmentId::random(),
                    user_id: identity.id,
                    role,
                    created_at: Utc::now(),
                }],
            )
            .await
            .unwrap();
        SessionState::resolved(Some(identity))
    }

    async fn open_as_admin() -> (Arc<MemoryRecordStore>, AdminPanel, SessionState) {
        let store = Arc::new(MemoryRecordStore::new());
        let session = with_role(&store, AppRole::Admin).await;
        let roles = RoleResolver::new(store.clone());
        let panel = AdminPanel::open(store.clone(), &roles, &session, None)
            .await
            .unwrap();
        (store, panel, session)
    }

    #[tokio::test]
    async fn test_gate_messages() {
        let store = Arc::new(MemoryRecordStore::new());
        let roles = RoleResolver::new(store.clone());

        let err = admin_gate(&SessionState::loading(), &roles).await.unwrap_err();
        assert!(matches!(
            err,
            PortalError::Authorization(AuthorizationError::SessionLoading)
        ));

        let err = admin_gate(&SessionState::resolved(None), &roles).await.unwrap_err();
        assert_eq!(err.to_string(), "authentication required");

        let member = with_role(&store, AppRole::User).await;
        let err = admin_gate(&member, &roles).await.unwrap_err();
        assert_eq!(err.to_string(), "access denied");
    }

    #[tokio::test]
    async fn test_create_news_publishes_and_clears_form() {
        let (store, mut panel, session) = open_as_admin().await;
        panel.news_form = NewsDraft {
            title: "Fair".to_string(),
            content: "The county fair opens Saturday.".to_string(),
            excerpt: String::new(),
        };

        let done = panel.create_news(&session).await.unwrap();
        assert!(done.refresh_error.is_none());
        assert_eq!(panel.news_form, NewsDraft::default());
        assert_eq!(panel.news().len(), 1);
        assert!(panel.news()[0].published);
        assert_eq!(panel.news()[0].author_id, panel.admin().id);
        assert_eq!(store.count(Operation::Insert, Table::NewsPosts).await, 1);
    }

    #[tokio::test]
    async fn test_invalid_event_sends_nothing() {
        let (store, mut panel, session) = open_as_admin().await;
        let before = store.call_count().await;
        panel.event_form.title = "Parade".to_string();

        let err = panel.create_event(&session).await.unwrap_err();
        assert!(matches!(err, PortalError::Validation(ref m) if m == "event date is required"));
        assert_eq!(store.call_count().await, before);
        assert_eq!(panel.event_form.title, "Parade");
    }

    #[tokio::test]
    async fn test_events_listed_soonest_first() {
        let (_store, mut panel, session) = open_as_admin().await;
        for (title, date) in [("Parade", "2025-07-04"), ("Market", "2025-06-01T09:00")] {
            panel.event_form = EventDraft {
                title: title.to_string(),
                event_date: date.to_string(),
                ..EventDraft::default()
            };
            let _ = panel.create_event(&session).await.unwrap();
        }

        let titles: Vec<_> = panel.events().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Market", "Parade"]);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let (store, mut panel, session) = open_as_admin().await;
        panel.news_form.title = "Fair".to_string();
        panel.news_form.content = "Saturday".to_string();
        let _ = panel.create_news(&session).await.unwrap();
        let id = panel.news()[0].id;

        store.fail(Operation::Delete, Table::NewsPosts).await;
        let err = panel.delete_news(id, &session).await.unwrap_err();
        assert!(matches!(err, PortalError::Backend(_)));
        assert_eq!(panel.news().len(), 1);

        store.recover(Operation::Delete, Table::NewsPosts).await;
        let _ = panel.delete_news(id, &session).await.unwrap();
        assert!(panel.news().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_closes_panel() {
        let (store, mut panel, _session) = open_as_admin().await;
        let before = store.call_count().await;
        panel.news_form.title = "Fair".to_string();
        panel.news_form.content = "Saturday".to_string();

        let err = panel
            .create_news(&SessionState::resolved(None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "authentication required");
        assert_eq!(store.call_count().await, before);
    }

    #[tokio::test]
    async fn test_limit_caps_lists() {
        let store = Arc::new(MemoryRecordStore::new());
        let session = with_role(&store, AppRole::Admin).await;
        let roles = RoleResolver::new(store.clone());
        let mut panel = AdminPanel::open(store.clone(), &roles, &session, Some(1))
            .await
            .unwrap();

        for title in ["One", "Two"] {
            panel.news_form.title = title.to_string();
            panel.news_form.content = "Body".to_string();
            let _ = panel.create_news(&session).await.unwrap();
        }
        assert_eq!(panel.news().len(), 1);
        assert_eq!(store.rows(Table::NewsPosts).await.len(), 2);
    }
}
