//! Hidden "Whisper Wire" page: footer trigger and route guard.

use std::sync::Arc;

use sol_city_core::unlock::{
    ClickOutcome, FALLBACK_ROUTE, HIDDEN_ROUTE, UNLOCK_FLAG_KEY, UNLOCK_FLAG_VALUE, UnlockCounter,
    is_unlocked,
};

use crate::navigation::Navigator;
use crate::storage::{DurableStorage, StorageError};

/// The footer's click target. Lives as long as the page; the counter is
/// not persisted.
pub struct SecretTrigger {
    counter: UnlockCounter,
    storage: Arc<dyn DurableStorage>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for SecretTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretTrigger")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

impl SecretTrigger {
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStorage>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            counter: UnlockCounter::new(),
            storage,
            navigator,
        }
    }

    #[must_use]
    pub const fn clicks(&self) -> u32 {
        self.counter.clicks()
    }

    /// Hover hint, e.g. `"3/7 clicks"`.
    #[must_use]
    pub fn hint(&self) -> String {
        self.counter.hint()
    }

    /// Register a click. The unlocking click persists the flag, then
    /// redirects to the hidden page.
    ///
    /// # Errors
    ///
    /// Returns error if the flag cannot be stored; no redirect happens then.
    pub async fn click(&mut self) -> Result<ClickOutcome, StorageError> {
        let outcome = self.counter.click();
        if outcome == ClickOutcome::Unlock {
            self.storage.set(UNLOCK_FLAG_KEY, UNLOCK_FLAG_VALUE).await?;
            tracing::info!("Whisper Wire unlocked");
            self.navigator.redirect(HIDDEN_ROUTE);
        }
        Ok(outcome)
    }
}

/// Guard for the hidden route. Returns whether the page may render;
/// otherwise the visitor has been redirected to the homepage.
///
/// # Errors
///
/// Returns error if the flag cannot be read.
pub async fn guard(
    storage: &dyn DurableStorage,
    navigator: &dyn Navigator,
) -> Result<bool, StorageError> {
    let flag = storage.get(UNLOCK_FLAG_KEY).await?;
    if is_unlocked(flag.as_deref()) {
        return Ok(true);
    }
    navigator.redirect(FALLBACK_ROUTE);
    Ok(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::navigation::RecordingNavigator;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_six_clicks_leave_no_trace() {
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let mut trigger = SecretTrigger::new(storage.clone(), navigator.clone());

        for _ in 0..6 {
            trigger.click().await.unwrap();
        }
        assert_eq!(storage.get(UNLOCK_FLAG_KEY).await.unwrap(), None);
        assert!(navigator.visited().is_empty());
        assert_eq!(trigger.hint(), "6/7 clicks");
    }

    #[tokio::test]
    async fn test_seventh_click_unlocks_and_redirects_once() {
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let mut trigger = SecretTrigger::new(storage.clone(), navigator.clone());

        for _ in 0..10 {
            trigger.click().await.unwrap();
        }
        assert_eq!(
            storage.get(UNLOCK_FLAG_KEY).await.unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(navigator.visited(), ["/whisper-wire"]);
    }

    #[tokio::test]
    async fn test_guard_redirects_until_unlocked() {
        let storage = MemoryStorage::new();
        let navigator = RecordingNavigator::new();

        assert!(!guard(&storage, &navigator).await.unwrap());
        assert_eq!(navigator.visited(), ["/"]);

        storage.set(UNLOCK_FLAG_KEY, "true").await.unwrap();
        assert!(guard(&storage, &navigator).await.unwrap());
        assert_eq!(navigator.visited().len(), 1);
    }
}
