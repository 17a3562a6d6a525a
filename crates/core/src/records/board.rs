//! Community board posts.

use serde::{Deserialize, Serialize};

/// A post on the community bulletin board.
///
/// Board posts ship as a data file rather than a backend table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPost {
    pub id: String,
    pub title: String,
    pub category: String,
    pub content: String,
    pub author: String,
    /// Human-readable age, e.g. "2 hours ago".
    pub posted: String,
    #[serde(default)]
    pub replies: u32,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}
