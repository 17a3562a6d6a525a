//! Unified error handling with Sentry integration.
//!
//! Every workflow returns `Result<T, PortalError>`. The three kinds mirror
//! how a page reacts:
//!
//! - `Validation` - caught before any network call, shown inline
//! - `Authorization` - the action is hidden or rejected with an explicit message
//! - `Backend` - the record store or identity provider failed; local state is
//!   left as it was so the user can retry

use thiserror::Error;

use sol_city_core::editor::EditorError;
use sol_city_core::records::DraftError;

use crate::backend::BackendError;

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    /// Nobody is signed in.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Signed in, but without the required role.
    #[error("access denied")]
    AccessDenied,

    /// Signed in, but not the owner of the record.
    #[error("only the owner can edit this listing")]
    NotOwner,

    /// The session has not resolved yet.
    #[error("still checking your session")]
    SessionLoading,
}

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum PortalError {
    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The viewer may not perform this action.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// Record store or identity provider failure.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Requested record does not exist (or is hidden by row-level security).
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<DraftError> for PortalError {
    fn from(err: DraftError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<EditorError> for PortalError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::NotOwner => Self::Authorization(AuthorizationError::NotOwner),
            EditorError::NotEditing | EditorError::MissingField(_) => {
                Self::Validation(err.to_string())
            }
        }
    }
}

impl PortalError {
    /// Message suitable for a toast; backend details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(_) => "Something went wrong talking to the server".to_string(),
            Self::Authorization(AuthorizationError::AuthenticationRequired) => {
                "Please log in to continue".to_string()
            }
            Self::Authorization(AuthorizationError::AccessDenied) => {
                "You don't have permission to access this page".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Log the error, capturing backend failures to Sentry.
    pub fn report(&self) {
        if matches!(self, Self::Backend(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Backend error"
            );
        } else {
            tracing::warn!(error = %self, "Action rejected");
        }
    }
}

/// Result type alias for `PortalError`.
pub type Result<T> = std::result::Result<T, PortalError>;

/// Set the Sentry user context from the signed-in identity.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context after sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_error_display() {
        let err = PortalError::NotFound("business 42".to_string());
        assert_eq!(err.to_string(), "Not found: business 42");

        let err = PortalError::from(AuthorizationError::AuthenticationRequired);
        assert_eq!(err.to_string(), "authentication required");

        let err = PortalError::from(AuthorizationError::AccessDenied);
        assert_eq!(err.to_string(), "access denied");
    }

    #[test]
    fn test_draft_errors_are_validation() {
        let err = PortalError::from(DraftError::MissingField("content"));
        assert!(matches!(err, PortalError::Validation(ref m) if m == "content is required"));
    }

    #[test]
    fn test_editor_errors_map_by_kind() {
        assert!(matches!(
            PortalError::from(EditorError::NotOwner),
            PortalError::Authorization(AuthorizationError::NotOwner)
        ));
        assert!(matches!(
            PortalError::from(EditorError::MissingField("name")),
            PortalError::Validation(_)
        ));
    }

    #[test]
    fn test_user_message_hides_backend_details() {
        let err = PortalError::Backend(BackendError::Api {
            status: 500,
            message: "relation \"businesses\" does not exist".to_string(),
        });
        assert_eq!(err.user_message(), "Something went wrong talking to the server");
    }
}
