//! Business reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BusinessId, Rating, ReviewId, UserId};

/// Row in the `reviews` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub business_id: BusinessId,
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: Option<String>,
    /// Reviewer's display name when the review was written.
    pub reviewer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the `reviews` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub business_id: BusinessId,
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: Option<String>,
    pub reviewer_name: String,
}
