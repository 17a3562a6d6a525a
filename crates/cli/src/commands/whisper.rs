//! The hidden page, reached by clicking the mayor's office number in the
//! footer seven times.
//!
//! The click counter lives for one invocation, so all clicks must arrive in
//! the same `footer --clicks N` call. The unlock flag persists in the
//! storage file.

use std::path::Path;
use std::sync::Arc;

use sol_city_portal::navigation::Navigator;
use sol_city_portal::pages::whisper::{SecretTrigger, guard};
use sol_city_portal::storage::FileStorage;

use crate::{CliError, output};

/// Navigator that reports redirects on the terminal.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn redirect(&self, path: &str) {
        output::line(format!("-> {path}"));
    }
}

struct Dispatch {
    title: &'static str,
    classification: &'static str,
    content: &'static str,
    source: &'static str,
}

const DISPATCHES: &[Dispatch] = &[
    Dispatch {
        title: "Odd Signals Over the Old Observatory",
        classification: "CLASSIFIED",
        content: "Instruments abandoned in the dome keep logging electromagnetic spikes \
                  that match nothing in the weather or survey records.",
        source: "Observatory Keeper",
    },
    Dispatch {
        title: "A Pattern in the Missing Persons Reports",
        classification: "CONFIDENTIAL",
        content: "Seven residents vanished near Whispering Woods this season, each on a \
                  new-moon night. Nobody official has lined up the dates.",
        source: "Anonymous Detective",
    },
    Dispatch {
        title: "What Runs Beneath Sol City",
        classification: "TOP SECRET",
        content: "The founders built on top of something far older than the town. The \
                  tunnels under Main Street were never meant for pipes.",
        source: "Historical Archivist",
    },
];

/// Click the footer trigger `clicks` times.
pub async fn footer(storage: &Path, clicks: u32) -> Result<(), CliError> {
    let mut trigger = SecretTrigger::new(
        Arc::new(FileStorage::new(storage)),
        Arc::new(ConsoleNavigator),
    );
    for _ in 0..clicks {
        trigger.click().await?;
    }
    output::line("Mayor's Office: (555) 555-MAYOR");
    tracing::debug!(hint = %trigger.hint(), "Footer clicked");
    Ok(())
}

/// Render the hidden page, or send the visitor home.
pub async fn open(storage: &Path) -> Result<(), CliError> {
    let storage = FileStorage::new(storage);
    if !guard(&storage, &ConsoleNavigator).await? {
        output::line("Access restricted. You need special clearance for this area.");
        return Ok(());
    }

    output::heading("Whisper Wire - Classified Information Network");
    output::line("Restricted to authorized personnel. Do not distribute.");
    for dispatch in DISPATCHES {
        output::line("");
        output::line(format!("[{}] {}", dispatch.classification, dispatch.title));
        output::line(format!("   {}", dispatch.content));
        output::line(format!("   Source: {}", dispatch.source));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sol_city_core::unlock::UNLOCK_FLAG_KEY;
    use sol_city_portal::storage::DurableStorage;

    #[tokio::test]
    async fn test_seven_clicks_persist_the_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        footer(&path, 7).await.unwrap();

        let stored = FileStorage::new(&path).get(UNLOCK_FLAG_KEY).await.unwrap();
        assert_eq!(stored.as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_clicks_do_not_accumulate_across_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        footer(&path, 4).await.unwrap();
        footer(&path, 3).await.unwrap();

        let stored = FileStorage::new(&path).get(UNLOCK_FLAG_KEY).await.unwrap();
        assert_eq!(stored, None);
    }
}
