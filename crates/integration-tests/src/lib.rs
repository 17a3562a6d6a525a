//! End-to-end tests for the Sol City Portal.
//!
//! Every test drives the real page controllers and session store against
//! the in-memory backends from `sol_city_portal::backend::memory`, so call
//! counters can prove what was (or was not) sent.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sol-city-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `directory` - Directory, board and property listings
//! - `business_page` - Ownership gating, edits and reviews
//! - `admin_content` - Admin gate and the news/event workflow
//! - `session` - Session convergence and role resolution
//! - `whisper_wire` - Footer unlock and the hidden route

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sol_city_core::records::{Business, Identity, Menu, RoleAssignment};
use sol_city_core::types::{AppRole, BusinessId, RoleAssignmentId, UserId};
use sol_city_portal::PortalState;
use sol_city_portal::backend::Table;
use sol_city_portal::backend::memory::{MemoryIdentityProvider, MemoryRecordStore};
use sol_city_portal::storage::MemoryStorage;

/// In-memory portal with handles to every double.
pub struct TestPortal {
    pub records: Arc<MemoryRecordStore>,
    pub identity: Arc<MemoryIdentityProvider>,
    pub storage: Arc<MemoryStorage>,
    pub state: PortalState,
}

impl Default for TestPortal {
    fn default() -> Self {
        Self::with_timeout(None)
    }
}

impl TestPortal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Portal whose session store gives up on the provider after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let records = Arc::new(MemoryRecordStore::new());
        let identity = Arc::new(MemoryIdentityProvider::new());
        let storage = Arc::new(MemoryStorage::new());
        let state = PortalState::from_parts(records.clone(), identity.clone(), storage.clone(), timeout);
        Self {
            records,
            identity,
            storage,
            state,
        }
    }

    /// Store `businesses` in the `businesses` table.
    ///
    /// # Panics
    ///
    /// Panics if the rows cannot be serialized.
    pub async fn seed_businesses(&self, businesses: &[Business]) {
        self.records
            .seed(Table::Businesses, businesses)
            .await
            .unwrap_or_else(|e| panic!("seeding businesses: {e}"));
    }

    /// Assign `role` to `user`.
    ///
    /// # Panics
    ///
    /// Panics if the row cannot be serialized.
    pub async fn grant(&self, user: UserId, role: AppRole) {
        let assignment = RoleAssignment {
            id: RoleAssignmentId::random(),
            user_id: user,
            role,
            created_at: Utc::now(),
        };
        self.records
            .seed(Table::UserRoles, &[assignment])
            .await
            .unwrap_or_else(|e| panic!("seeding role: {e}"));
    }
}

/// A signed-in member called `name`.
#[must_use]
pub fn member(name: &str) -> Identity {
    Identity::new(
        UserId::random(),
        Some(name.to_string()),
        Some(format!("{}@solcity.test", name.to_lowercase())),
        None,
    )
}

/// A business listing owned by `owner`.
#[must_use]
pub fn business(name: &str, category: &str, owner: UserId) -> Business {
    let now = Utc::now();
    Business {
        id: BusinessId::random(),
        name: name.to_string(),
        category: category.to_string(),
        description: None,
        address: None,
        phone: None,
        hours: None,
        owner_id: owner,
        owner_name: None,
        featured: false,
        services: Vec::new(),
        menu: Menu::default(),
        created_at: now,
        updated_at: now,
    }
}
