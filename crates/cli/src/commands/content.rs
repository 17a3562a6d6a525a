//! Admin content: news posts and events.
//!
//! Every command opens the admin panel first, so a non-admin is refused
//! before anything is read or written.

use sol_city_core::records::{Event, EventDraft, NewsDraft, NewsPost};
use sol_city_core::types::{EventId, NewsPostId};
use sol_city_portal::PortalState;
use sol_city_portal::pages::Completed;
use sol_city_portal::pages::admin::AdminPanel;
use sol_city_portal::session::SessionState;

use crate::commands::parse_id;
use crate::{CliError, output};

async fn open_panel(
    state: &PortalState,
    limit: Option<usize>,
) -> Result<(AdminPanel, SessionState), CliError> {
    let session = state.start_session();
    let current = session.ready().await;
    session.close().await;

    let panel = AdminPanel::open(state.records(), &state.roles(), &current, limit).await?;
    Ok((panel, current))
}

fn report_refresh(completed: &Completed, what: &str) {
    if completed.refresh_error.is_some() {
        output::line(format!("The {what} list could not be reloaded."));
    }
}

pub async fn list_news(state: &PortalState, limit: Option<usize>) -> Result<(), CliError> {
    let (panel, _) = open_panel(state, limit).await?;
    output::heading(format!("News ({})", panel.news().len()));
    if panel.news().is_empty() {
        output::line("No news posts yet.");
    }
    panel.news().iter().for_each(print_news);
    Ok(())
}

fn print_news(post: &NewsPost) {
    output::line(format!(
        " * {}  {}  {}",
        post.created_at.format("%Y-%m-%d"),
        post.title,
        post.id
    ));
    output::field("excerpt", post.excerpt.as_deref());
}

pub async fn create_news(
    state: &PortalState,
    title: String,
    content: String,
    excerpt: String,
) -> Result<(), CliError> {
    let (mut panel, session) = open_panel(state, None).await?;
    panel.news_form = NewsDraft {
        title,
        content,
        excerpt,
    };
    let completed = panel.create_news(&session).await?;

    output::line("News post published.");
    report_refresh(&completed, "news");
    Ok(())
}

pub async fn delete_news(state: &PortalState, id: &str) -> Result<(), CliError> {
    let id: NewsPostId = parse_id(id, "News post")?;
    let (mut panel, session) = open_panel(state, None).await?;
    let completed = panel.delete_news(id, &session).await?;

    output::line("News post deleted.");
    report_refresh(&completed, "news");
    Ok(())
}

pub async fn list_events(state: &PortalState, limit: Option<usize>) -> Result<(), CliError> {
    let (panel, _) = open_panel(state, limit).await?;
    output::heading(format!("Events ({})", panel.events().len()));
    if panel.events().is_empty() {
        output::line("No events scheduled.");
    }
    panel.events().iter().for_each(print_event);
    Ok(())
}

fn print_event(event: &Event) {
    output::line(format!(
        " * {}  {}  {}",
        event.event_date.format("%Y-%m-%d %H:%M"),
        event.title,
        event.id
    ));
    output::field("location", event.location.as_deref());
    output::field("about", event.description.as_deref());
}

pub async fn create_event(state: &PortalState, draft: EventDraft) -> Result<(), CliError> {
    let (mut panel, session) = open_panel(state, None).await?;
    panel.event_form = draft;
    let completed = panel.create_event(&session).await?;

    output::line("Event created.");
    report_refresh(&completed, "event");
    Ok(())
}

pub async fn delete_event(state: &PortalState, id: &str) -> Result<(), CliError> {
    let id: EventId = parse_id(id, "Event")?;
    let (mut panel, session) = open_panel(state, None).await?;
    let completed = panel.delete_event(id, &session).await?;

    output::line("Event deleted.");
    report_refresh(&completed, "event");
    Ok(())
}
