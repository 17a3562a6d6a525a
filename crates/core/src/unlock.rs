//! Click counter that unlocks the hidden "Whisper Wire" page.
//!
//! Clicking the mayor's office number in the footer seven times persists an
//! unlock flag and sends the visitor to the hidden page once. The counter
//! itself lives only as long as the page; the flag survives reloads.
//!
//! This is a discovery mechanic, not access control.

/// Storage key of the persisted unlock flag.
pub const UNLOCK_FLAG_KEY: &str = "sol_whisper_unlocked";

/// Value written under [`UNLOCK_FLAG_KEY`] once unlocked.
pub const UNLOCK_FLAG_VALUE: &str = "true";

/// Route of the hidden page.
pub const HIDDEN_ROUTE: &str = "/whisper-wire";

/// Where the hidden page sends visitors who have not unlocked it.
pub const FALLBACK_ROUTE: &str = "/";

/// Clicks needed to unlock.
pub const CLICKS_TO_UNLOCK: u32 = 7;

/// What a click asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing yet.
    Counting(u32),
    /// Exactly the unlocking click: persist the flag and redirect.
    Unlock,
}

/// Session-local click counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnlockCounter {
    clicks: u32,
}

impl UnlockCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self { clicks: 0 }
    }

    #[must_use]
    pub const fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Register a click. Only the click that lands exactly on
    /// [`CLICKS_TO_UNLOCK`] returns [`ClickOutcome::Unlock`]; later clicks
    /// keep counting without unlocking again.
    pub const fn click(&mut self) -> ClickOutcome {
        self.clicks = self.clicks.saturating_add(1);
        if self.clicks == CLICKS_TO_UNLOCK {
            ClickOutcome::Unlock
        } else {
            ClickOutcome::Counting(self.clicks)
        }
    }

    /// Progress hint shown on hover, e.g. `"3/7 clicks"`; empty before the
    /// first click.
    #[must_use]
    pub fn hint(&self) -> String {
        if self.clicks == 0 {
            String::new()
        } else {
            format!("{}/{CLICKS_TO_UNLOCK} clicks", self.clicks)
        }
    }
}

/// Whether a stored flag value grants access to the hidden page.
#[must_use]
pub fn is_unlocked(stored: Option<&str>) -> bool {
    stored == Some(UNLOCK_FLAG_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_clicks_do_not_unlock() {
        let mut counter = UnlockCounter::new();
        for expected in 1..=6 {
            assert_eq!(counter.click(), ClickOutcome::Counting(expected));
        }
        assert_eq!(counter.hint(), "6/7 clicks");
    }

    #[test]
    fn test_seventh_click_unlocks_once() {
        let mut counter = UnlockCounter::new();
        let outcomes: Vec<_> = (0..12).map(|_| counter.click()).collect();
        let unlocks = outcomes.iter().filter(|o| **o == ClickOutcome::Unlock).count();

        assert_eq!(unlocks, 1);
        assert_eq!(outcomes[6], ClickOutcome::Unlock);
        assert_eq!(counter.clicks(), 12);
    }

    #[test]
    fn test_hint_empty_before_first_click() {
        assert_eq!(UnlockCounter::new().hint(), "");
    }

    #[test]
    fn test_is_unlocked() {
        assert!(is_unlocked(Some("true")));
        assert!(!is_unlocked(Some("false")));
        assert!(!is_unlocked(Some("TRUE")));
        assert!(!is_unlocked(None));
    }
}
