//! Review aggregation and the review form.

use crate::records::Review;
use crate::types::Rating;

/// Arithmetic mean of the ratings, or `0.0` when there are no reviews.
#[must_use]
pub fn average(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating.get())).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = reviews.len() as f64;
    f64::from(sum) / count
}

/// Average rating rounded to one decimal place, e.g. `4.3`.
#[must_use]
pub fn format_average(reviews: &[Review]) -> String {
    format!("{:.1}", average(reviews))
}

/// State of the "write a review" form on a business page.
///
/// Only reset and closed once the backend has confirmed the submission, so
/// a failed submit leaves the user's text in place for a retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewForm {
    pub open: bool,
    pub rating: Rating,
    pub comment: String,
}

impl ReviewForm {
    /// Toggle the form's visibility.
    pub const fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// The comment to store, `None` when blank.
    #[must_use]
    pub fn comment(&self) -> Option<String> {
        let trimmed = self.comment.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Reset to five stars with an empty comment and close the form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BusinessId, ReviewId, UserId};
    use chrono::Utc;

    fn reviews(ratings: &[i64]) -> Vec<Review> {
        let business_id = BusinessId::random();
        ratings
            .iter()
            .map(|&r| Review {
                id: ReviewId::random(),
                business_id,
                user_id: UserId::random(),
                rating: Rating::new(r).unwrap(),
                comment: None,
                reviewer_name: None,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_average_of_nothing_is_zero() {
        assert!(average(&[]).abs() < f64::EPSILON);
        assert_eq!(format_average(&[]), "0.0");
    }

    #[test]
    fn test_average_is_arithmetic_mean() {
        assert!((average(&reviews(&[5])) - 5.0).abs() < 1e-9);
        assert!((average(&reviews(&[4, 5])) - 4.5).abs() < 1e-9);
        assert!((average(&reviews(&[1, 2, 2])) - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_average_rounds_to_one_decimal() {
        assert_eq!(format_average(&reviews(&[5, 4, 4])), "4.3");
        assert_eq!(format_average(&reviews(&[3])), "3.0");
    }

    #[test]
    fn test_review_form_reset() {
        let mut form = ReviewForm::default();
        assert_eq!(form.rating.get(), 5);
        assert!(!form.open);

        form.toggle();
        form.rating = Rating::new(2).unwrap();
        form.comment = "  Cold coffee ".to_string();
        assert_eq!(form.comment(), Some("Cold coffee".to_string()));

        form.reset();
        assert_eq!(form, ReviewForm::default());
        assert_eq!(form.comment(), None);
    }
}
