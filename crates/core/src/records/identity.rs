//! Signed-in identity and the tables keyed by it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AppRole, RoleAssignmentId, UserId};

/// The signed-in user as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user ID.
    pub id: UserId,
    /// Name shown in the header and on authored content.
    pub display_name: String,
    /// Email address, if the provider shared one.
    pub email: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Build an identity, picking the display name the way the header does:
    /// the provider's full name if present, then the email, then the raw ID.
    #[must_use]
    pub fn new(
        id: UserId,
        full_name: Option<String>,
        email: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        let display_name = full_name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| email.clone())
            .unwrap_or_else(|| id.to_string());

        Self {
            id,
            display_name,
            email,
            avatar_url,
        }
    }
}

/// Row in the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub discord_id: Option<String>,
}

impl Profile {
    /// Name recorded on reviews written by this profile.
    pub const ANONYMOUS: &'static str = "Anonymous";

    /// Display name, or `"Anonymous"` when unset.
    #[must_use]
    pub fn reviewer_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(Self::ANONYMOUS)
    }
}

/// Row in the `user_roles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: RoleAssignmentId,
    pub user_id: UserId,
    pub role: AppRole,
    pub created_at: DateTime<Utc>,
}
