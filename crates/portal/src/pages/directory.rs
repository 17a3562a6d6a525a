//! Listing pages: business directory, real-estate listings and the
//! community board.
//!
//! Loading is the only I/O; filtering is done by
//! [`ListingFilter`](sol_city_core::listing::ListingFilter) on the loaded
//! records.

use std::path::Path;

use tracing::instrument;

use sol_city_core::records::{BoardPost, Business, Property};

use crate::backend::{Direction, Query, RecordStore, Table, select_rows};
use crate::error::{PortalError, Result};

/// All businesses visible to the viewer, alphabetical.
///
/// # Errors
///
/// Returns error if the query fails.
#[instrument(skip(store))]
pub async fn load_businesses(store: &dyn RecordStore) -> Result<Vec<Business>> {
    let query = Query::new().order_by("name", Direction::Ascending);
    let businesses: Vec<Business> = select_rows(store, Table::Businesses, &query).await?;
    tracing::debug!(count = businesses.len(), "Loaded businesses");
    Ok(businesses)
}

/// Property listings, newest first.
///
/// # Errors
///
/// Returns error if the query fails.
#[instrument(skip(store))]
pub async fn load_properties(store: &dyn RecordStore) -> Result<Vec<Property>> {
    let query = Query::new().order_by("created_at", Direction::Descending);
    let properties: Vec<Property> = select_rows(store, Table::Properties, &query).await?;
    tracing::debug!(count = properties.len(), "Loaded properties");
    Ok(properties)
}

/// Board posts from a YAML data file, in file order.
///
/// # Errors
///
/// Returns `NotFound` if the file is missing and `Validation` if it does
/// not hold a list of posts.
#[instrument]
pub async fn load_board(path: &Path) -> Result<Vec<BoardPost>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PortalError::NotFound(format!("board data {}: {e}", path.display())))?;
    parse_board(&raw)
}

/// Parse board posts from YAML.
///
/// # Errors
///
/// Returns `Validation` if `raw` does not hold a list of posts.
pub fn parse_board(raw: &str) -> Result<Vec<BoardPost>> {
    serde_yaml::from_str(raw).map_err(|e| PortalError::Validation(format!("board data: {e}")))
}

/// Split posts into pinned and regular, each keeping its order.
#[must_use]
pub fn pinned_first<'a>(posts: &[&'a BoardPost]) -> (Vec<&'a BoardPost>, Vec<&'a BoardPost>) {
    posts.iter().copied().partition(|p| p.pinned)
}
