//! Programmatic redirects to in-app paths.

use std::sync::Mutex;

/// Something that can send the user to another in-app path.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths redirected to, oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        tracing::debug!(path, "Redirect");
        let mut visited = self
            .visited
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        visited.push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator() {
        let navigator = RecordingNavigator::new();
        navigator.redirect("/whisper-wire");
        navigator.redirect("/");
        assert_eq!(navigator.visited(), ["/whisper-wire", "/"]);
    }
}
