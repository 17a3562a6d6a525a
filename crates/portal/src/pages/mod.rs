//! Page controllers.
//!
//! Each controller owns the state one page shows and drives the backend
//! calls behind its actions. Nothing here renders; the CLI (or any other
//! front end) reads the state and reports errors via
//! [`PortalError::user_message`](crate::PortalError::user_message).

pub mod admin;
pub mod business;
pub mod directory;
pub mod whisper;

use crate::backend::BackendError;

/// Outcome of a mutation that succeeded and was followed by a list reload.
///
/// The mutation is done either way; `refresh_error` reports only whether the
/// displayed list could be reloaded afterwards.
#[derive(Debug)]
#[must_use]
pub struct Completed {
    pub refresh_error: Option<BackendError>,
}

impl Completed {
    pub(crate) fn after_refresh(refresh: Result<(), BackendError>) -> Self {
        let refresh_error = refresh.err();
        if let Some(e) = &refresh_error {
            tracing::warn!(error = %e, "Saved, but the list could not be reloaded");
        }
        Self { refresh_error }
    }
}
