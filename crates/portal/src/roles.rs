//! Role resolution against the `user_roles` table.
//!
//! Nothing is cached: callers ask again whenever the identity changes, and a
//! signed-out viewer resolves to [`Privilege::Anonymous`] without a query.

use std::sync::Arc;

use tracing::instrument;

use sol_city_core::records::{Identity, RoleAssignment};
use sol_city_core::types::{AppRole, Privilege, UserId};

use crate::backend::{BackendError, Query, RecordStore, Table, select_rows};

/// Resolves identities to privileges.
#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver").finish_non_exhaustive()
    }
}

impl RoleResolver {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All roles assigned to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the `user_roles` query fails.
    #[instrument(skip(self))]
    pub async fn roles(&self, user_id: UserId) -> Result<Vec<AppRole>, BackendError> {
        let query = Query::new().eq("user_id", user_id);
        let assignments: Vec<RoleAssignment> =
            select_rows(self.store.as_ref(), Table::UserRoles, &query).await?;
        Ok(assignments.into_iter().map(|a| a.role).collect())
    }

    /// Privilege of `identity`.
    ///
    /// # Errors
    ///
    /// Returns error if the `user_roles` query fails.
    pub async fn privilege(&self, identity: Option<&Identity>) -> Result<Privilege, BackendError> {
        let Some(identity) = identity else {
            return Ok(Privilege::Anonymous);
        };
        let roles = self.roles(identity.id).await?;
        let privilege = Privilege::from_roles(true, &roles);
        tracing::debug!(user_id = %identity.id, ?privilege, "Resolved privilege");
        Ok(privilege)
    }

    /// Whether `identity` holds an admin role assignment.
    ///
    /// # Errors
    ///
    /// Returns error if the `user_roles` query fails.
    pub async fn is_admin(&self, identity: Option<&Identity>) -> Result<bool, BackendError> {
        Ok(self.privilege(identity).await?.is_admin())
    }
}
