//! Review rating type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The value is outside the 1-5 star range.
    #[error("rating must be between {min} and {max} stars, got {value}")]
    OutOfRange {
        /// Rejected value.
        value: i64,
        /// Lowest allowed rating.
        min: u8,
        /// Highest allowed rating.
        max: u8,
    },
}

/// A star rating between 1 and 5 inclusive.
///
/// ## Examples
///
/// ```
/// use sol_city_core::Rating;
///
/// assert_eq!(Rating::new(4).unwrap().get(), 4);
/// assert!(Rating::new(0).is_err());
/// assert!(Rating::new(6).is_err());
/// assert_eq!(Rating::default().get(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating a review can carry.
    pub const MIN: u8 = 1;
    /// Highest rating a review can carry.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside `1..=5`.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] for values below 1 or above 5.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
    }

    /// Number of stars.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    /// New review forms start at five stars.
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert_eq!(
            Rating::new(-3),
            Err(RatingError::OutOfRange {
                value: -3,
                min: 1,
                max: 5
            })
        );
        assert!(Rating::new(300).is_err());
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("3").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_rating_display() {
        assert_eq!(Rating::new(4).unwrap().to_string(), "4/5");
    }
}
