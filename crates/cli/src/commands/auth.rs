//! Sign-in commands.
//!
//! The OAuth flow finishes in a browser. `login` prints the authorize URL;
//! the access token from the redirect is then passed back through
//! `SOL_CITY_ACCESS_TOKEN` on later invocations.

use sol_city_portal::PortalState;

use crate::{CliError, output};

pub async fn login(state: &PortalState) -> Result<(), CliError> {
    let url = state.sign_in_url().await?;
    output::line("Open this URL in a browser to sign in:");
    output::line(url);
    output::line("");
    output::line("Then export the access token from the redirect as SOL_CITY_ACCESS_TOKEN.");
    Ok(())
}

pub async fn logout(state: &PortalState) -> Result<(), CliError> {
    state.sign_out().await?;
    output::line("Signed out.");
    Ok(())
}

/// Show who is signed in and what they may do.
pub async fn whoami(state: &PortalState) -> Result<(), CliError> {
    let session = state.start_session();
    let current = session.ready().await;
    let privilege = state
        .roles()
        .privilege(current.identity.as_ref())
        .await
        .map_err(sol_city_portal::PortalError::from)?;
    session.close().await;

    match &current.identity {
        Some(identity) => {
            output::line(format!("Signed in as {}", identity.display_name));
            output::field("id", Some(&identity.id.to_string()));
            output::field("email", identity.email.as_deref());
        }
        None => output::line("Not signed in."),
    }
    output::field("privilege", Some(&format!("{privilege:?}")));
    Ok(())
}
