//! Business directory rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::types::{BusinessId, UserId};

/// Version of the `businesses.menu` JSON layout understood by [`Menu`].
///
/// Version 1: a JSON array of `{ "name": string, "price": number | string }`
/// objects, or `null` for no menu.
pub const MENU_SCHEMA_VERSION: u32 = 1;

/// One line on a business menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub price: Decimal,
}

impl MenuItem {
    /// Price formatted for display, e.g. `$3.50`.
    #[must_use]
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

/// A business menu (see [`MENU_SCHEMA_VERSION`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Menu {
    pub items: Vec<MenuItem>,
}

impl Menu {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Row in the `businesses` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    /// Free-text category tag, matched exactly by the directory filter.
    pub category: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub hours: Option<String>,
    /// Identity allowed to edit this listing.
    pub owner_id: UserId,
    /// Owner's display name at the time the listing was created.
    ///
    /// Not re-synced when the owner's profile changes.
    pub owner_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub menu: Menu,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The owner-editable fields of a [`Business`].
///
/// Sent whole in a single update call; also serves as the editor's buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessPatch {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub hours: Option<String>,
    pub services: Vec<String>,
    pub menu: Menu,
}

impl Business {
    /// Whether `user` may edit this listing.
    ///
    /// Always evaluate against the live session; `None` (signed out) never
    /// matches.
    #[must_use]
    pub fn is_owned_by(&self, user: Option<UserId>) -> bool {
        user.is_some_and(|id| id == self.owner_id)
    }

    /// Copy the editable fields out of this record.
    #[must_use]
    pub fn patch(&self) -> BusinessPatch {
        BusinessPatch {
            name: self.name.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            hours: self.hours.clone(),
            services: self.services.clone(),
            menu: self.menu.clone(),
        }
    }

    /// Overwrite the editable fields with `patch`.
    pub fn apply(&mut self, patch: BusinessPatch) {
        self.name = patch.name;
        self.description = patch.description;
        self.address = patch.address;
        self.phone = patch.phone;
        self.hours = patch.hours;
        self.services = patch.services;
        self.menu = patch.menu;
    }
}
