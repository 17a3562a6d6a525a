//! Row types for the hosted backend's tables.
//!
//! These are the shapes returned by (and sent to) the record store. Nullable
//! list and JSON columns are normalised to empty collections on the way in so
//! use sites never branch on `null`.
//!
//! ## Tables
//!
//! - `businesses` - [`Business`]
//! - `reviews` - [`Review`]
//! - `news_posts` - [`NewsPost`]
//! - `events` - [`Event`]
//! - `profiles` - [`Profile`]
//! - `user_roles` - [`RoleAssignment`]
//! - `properties` - [`Property`]
//!
//! Board posts ([`BoardPost`]) are not stored in the backend; they are
//! loaded from a data file.

pub mod board;
pub mod business;
pub mod content;
pub mod identity;
pub mod property;
pub mod review;

pub use board::BoardPost;
pub use business::{Business, BusinessPatch, MENU_SCHEMA_VERSION, Menu, MenuItem};
pub use content::{DraftError, Event, EventDraft, NewEvent, NewNewsPost, NewsDraft, NewsPost};
pub use identity::{Identity, Profile, RoleAssignment};
pub use property::{INTERIORS_SCHEMA_VERSION, InteriorValue, Interiors, Property};
pub use review::{NewReview, Review};

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable column into `T::default()` when it is `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
