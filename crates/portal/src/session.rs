//! Session store.
//!
//! Tracks the signed-in identity by listening to the identity provider's
//! push channel and, once, to the current-session snapshot. The two sources
//! race; whichever result *arrives* last is kept, regardless of which request
//! was issued first.
//!
//! `loading` is true until the first of the two resolves. If neither arrives
//! within the configured timeout the store gives up waiting and reports a
//! signed-out, loaded state; a late push event still wins afterwards.
//!
//! Dropping the store (or calling [`SessionStore::close`]) stops the
//! listener task, which drops the provider subscription.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use sol_city_core::records::Identity;
use sol_city_core::types::UserId;

use crate::backend::{BackendError, IdentityProvider, Session, Subscription};
use crate::error::{clear_sentry_user, set_sentry_user};

/// Snapshot of the session as seen by pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl SessionState {
    /// Initial state before either source resolved.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }

    /// Resolved state with `identity`.
    #[must_use]
    pub const fn resolved(identity: Option<Identity>) -> Self {
        Self {
            identity,
            loading: false,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.identity.as_ref().map(|i| i.id)
    }
}

/// Live session state shared with the pages.
#[derive(Debug)]
pub struct SessionStore {
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionStore {
    /// Subscribe to `provider`, request the snapshot and start tracking.
    ///
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn start(provider: Arc<dyn IdentityProvider>, timeout: Option<Duration>) -> Self {
        // Subscribe before asking for the snapshot so no change slips between
        let subscription = provider.subscribe();
        let (tx, state) = watch::channel(SessionState::loading());
        let task = tokio::spawn(listen(provider, subscription, timeout, tx));
        Self { state, task }
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.state.borrow().user_id()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Change notifications for callers that react to sign-in/sign-out.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Wait until loading finished and return that state.
    ///
    /// Returns the last known state if the listener stopped while loading.
    pub async fn ready(&self) -> SessionState {
        let mut rx = self.state.clone();
        let result = rx.wait_for(|s| !s.loading).await.map(|s| s.clone());
        result.unwrap_or_else(|_| rx.borrow().clone())
    }

    /// Stop listening and wait until the subscription is released.
    pub async fn close(mut self) {
        self.task.abort();
        // Cancelled is the expected outcome
        let _ = (&mut self.task).await;
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn listen(
    provider: Arc<dyn IdentityProvider>,
    mut subscription: Subscription,
    timeout: Option<Duration>,
    tx: watch::Sender<SessionState>,
) {
    let snapshot = provider.current_session();
    tokio::pin!(snapshot);

    let deadline = async move {
        match timeout {
            Some(t) => tokio::time::sleep(t).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let mut snapshot_done = false;
    let mut channel_open = true;
    let mut deadline_done = false;

    while channel_open || !snapshot_done {
        tokio::select! {
            event = subscription.recv(), if channel_open => match event {
                Some(event) => {
                    tracing::debug!(?event, "Auth state changed");
                    publish(&tx, event.session());
                }
                None => {
                    tracing::debug!("Auth event channel closed");
                    channel_open = false;
                }
            },
            result = &mut snapshot, if !snapshot_done => {
                snapshot_done = true;
                on_snapshot(&tx, result);
            }
            () = &mut deadline, if !deadline_done && tx.borrow().loading => {
                deadline_done = true;
                tracing::warn!(?timeout, "Identity provider did not answer, continuing signed out");
                tx.send_replace(SessionState::resolved(None));
            }
        }
    }
}

fn on_snapshot(tx: &watch::Sender<SessionState>, result: Result<Option<Session>, BackendError>) {
    match result {
        Ok(session) => publish(tx, session.as_ref()),
        Err(e) => {
            // A failed snapshot only settles loading; it never overrides a pushed session
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Failed to fetch session");
            tx.send_if_modified(|state| {
                if state.loading {
                    *state = SessionState::resolved(None);
                    true
                } else {
                    false
                }
            });
        }
    }
}

fn publish(tx: &watch::Sender<SessionState>, session: Option<&Session>) {
    let identity = session.map(|s| s.identity.clone());
    match &identity {
        Some(identity) => set_sentry_user(&identity.id, identity.email.as_deref()),
        None => clear_sentry_user(),
    }
    tx.send_replace(SessionState::resolved(identity));
}
