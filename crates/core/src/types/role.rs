//! Application roles and derived privilege levels.

use serde::{Deserialize, Serialize};

/// Role stored in the `user_roles` table (`app_role` enum in the backend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    /// Full access to the content admin panel.
    Admin,
    /// Community moderator. Grants nothing in the admin panel.
    Moderator,
    /// Regular signed-in member.
    User,
}

impl std::fmt::Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Moderator => write!(f, "moderator"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for AppRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid app role: {s}")),
        }
    }
}

/// Privilege level of whoever is looking at a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Privilege {
    /// Nobody is signed in.
    Anonymous,
    /// Signed in without an admin role assignment.
    Authenticated,
    /// Signed in and holds at least one `admin` role assignment.
    Administrator,
}

impl Privilege {
    /// Derive the privilege from sign-in state and the roles held.
    ///
    /// Roles are ignored when nobody is signed in.
    #[must_use]
    pub fn from_roles(signed_in: bool, roles: &[AppRole]) -> Self {
        if !signed_in {
            Self::Anonymous
        } else if roles.contains(&AppRole::Admin) {
            Self::Administrator
        } else {
            Self::Authenticated
        }
    }

    /// Whether this privilege grants access to the admin panel.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [AppRole::Admin, AppRole::Moderator, AppRole::User] {
            assert_eq!(role.to_string().parse::<AppRole>().unwrap(), role);
        }
        assert!("owner".parse::<AppRole>().is_err());
    }

    #[test]
    fn test_role_deserializes_from_backend_value() {
        let role: AppRole = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(role, AppRole::Moderator);
    }

    #[test]
    fn test_privilege_from_roles() {
        assert_eq!(
            Privilege::from_roles(false, &[AppRole::Admin]),
            Privilege::Anonymous
        );
        assert_eq!(Privilege::from_roles(true, &[]), Privilege::Authenticated);
        assert_eq!(
            Privilege::from_roles(true, &[AppRole::User, AppRole::Moderator]),
            Privilege::Authenticated
        );
        assert_eq!(
            Privilege::from_roles(true, &[AppRole::User, AppRole::Admin]),
            Privilege::Administrator
        );
    }
}
