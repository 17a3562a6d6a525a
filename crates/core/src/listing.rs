//! Category and free-text filtering for listing pages.
//!
//! The business directory, community board and real-estate page all reduce
//! an in-memory collection the same way: an exact category selector ANDed
//! with a case-insensitive substring search over a few text fields. Input
//! order is always preserved.

use crate::records::{BoardPost, Business, Property};

/// Category selector that matches every record.
pub const ALL: &str = "All";

/// Category buttons on the business directory.
pub const DIRECTORY_CATEGORIES: &[&str] = &[
    ALL,
    "Food & Drink",
    "Retail",
    "Hardware & Tools",
    "Automotive",
    "Services",
];

/// Category buttons on the community board.
pub const BOARD_CATEGORIES: &[&str] = &[
    ALL,
    "Events",
    "Lost & Found",
    "Activities",
    "Sales",
    "Transportation",
    "Services",
    "General",
];

/// A record that can appear on a filtered listing page.
pub trait Listing {
    /// Category tag, or `None` for listings without categories.
    fn category(&self) -> Option<&str>;

    /// Text fields searched by the free-text query.
    fn search_fields(&self) -> Vec<&str>;
}

impl Listing for Business {
    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

impl Listing for BoardPost {
    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.content.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }
}

impl Listing for Property {
    fn category(&self) -> Option<&str> {
        None
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.neighborhood.as_deref());
        fields.extend(self.street_name.as_deref());
        fields
    }
}

/// Filter selections on a listing page.
///
/// Starts at category `"All"` with an empty search; not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilter {
    pub category: String,
    pub query: String,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            category: ALL.to_string(),
            query: String::new(),
        }
    }
}

impl ListingFilter {
    #[must_use]
    pub fn new(category: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            query: query.into(),
        }
    }

    /// Whether `record` passes both the category and the text predicate.
    ///
    /// Records without a category only pass the `"All"` selector.
    #[must_use]
    pub fn matches<T: Listing>(&self, record: &T) -> bool {
        let category_ok = self.category == ALL || record.category() == Some(self.category.as_str());
        if !category_ok {
            return false;
        }
        if self.query.is_empty() {
            return true;
        }

        let needle = self.query.to_lowercase();
        record
            .search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Apply the filter, preserving input order.
    #[must_use]
    pub fn apply<'a, T: Listing>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }
}

/// Filter `records` by `category` and `query`.
#[must_use]
pub fn filter<'a, T: Listing>(records: &'a [T], category: &str, query: &str) -> Vec<&'a T> {
    ListingFilter::new(category, query).apply(records)
}

/// Directory results split into featured and regular groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryView<'a> {
    pub featured: Vec<&'a Business>,
    pub regular: Vec<&'a Business>,
}

impl<'a> DirectoryView<'a> {
    /// Filter `businesses` and partition the matches, each group keeping the
    /// input order.
    #[must_use]
    pub fn build(businesses: &'a [Business], filter: &ListingFilter) -> Self {
        let (featured, regular) = filter.apply(businesses).into_iter().partition(|b| b.featured);
        Self { featured, regular }
    }

    /// True when nothing matched; the page shows its empty-state message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.featured.is_empty() && self.regular.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.featured.len() + self.regular.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Menu;
    use crate::types::{BusinessId, UserId};
    use chrono::Utc;

    fn business(name: &str, category: &str, description: &str, featured: bool) -> Business {
        Business {
            id: BusinessId::random(),
            name: name.to_string(),
            category: category.to_string(),
            description: Some(description.to_string()),
            address: None,
            phone: None,
            hours: None,
            owner_id: UserId::random(),
            owner_name: None,
            featured,
            services: Vec::new(),
            menu: Menu::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn post(title: &str, category: &str, tags: &[&str]) -> BoardPost {
        BoardPost {
            id: title.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            content: "See you there".to_string(),
            author: "GreenThumb_Sally".to_string(),
            posted: "2 hours ago".to_string(),
            replies: 0,
            likes: 0,
            pinned: false,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    fn directory() -> Vec<Business> {
        vec![
            business("The Grind Coffee & Books", "Food & Drink", "Freshly roasted beans", true),
            business("Riverside Diner", "Food & Drink", "Hearty breakfast", false),
            business("Sol City Hardware", "Hardware & Tools", "Tools and paint", false),
            business("Whispers Bookstore", "Retail", "Rare books and antiques", true),
        ]
    }

    fn names<'a>(records: &[&'a Business]) -> Vec<&'a str> {
        records.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn test_all_and_empty_query_returns_everything_in_order() {
        let records = directory();
        let result = filter(&records, ALL, "");
        assert_eq!(result.len(), records.len());
        for (got, want) in result.iter().zip(&records) {
            assert!(std::ptr::eq(*got, want));
        }
    }

    #[test]
    fn test_category_is_exact_and_case_sensitive() {
        let records = directory();
        assert_eq!(
            names(&filter(&records, "Food & Drink", "")),
            vec!["The Grind Coffee & Books", "Riverside Diner"]
        );
        assert!(filter(&records, "food & drink", "").is_empty());
        assert!(filter(&records, "Food", "").is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive_over_name_and_description() {
        let records = directory();
        assert_eq!(names(&filter(&records, ALL, "BOOK")), vec![
            "The Grind Coffee & Books",
            "Whispers Bookstore"
        ]);
        assert_eq!(names(&filter(&records, ALL, "paint")), vec!["Sol City Hardware"]);
    }

    #[test]
    fn test_predicates_are_anded() {
        let records = directory();
        assert_eq!(names(&filter(&records, "Retail", "book")), vec!["Whispers Bookstore"]);
        assert!(filter(&records, "Hardware & Tools", "book").is_empty());
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        let records: Vec<Business> = Vec::new();
        assert!(filter(&records, "Retail", "anything").is_empty());
    }

    #[test]
    fn test_board_search_covers_tags() {
        let posts = vec![
            post("Garden Planning Meeting", "Events", &["gardening", "volunteers"]),
            post("Lost Cat - Mittens", "Lost & Found", &["cat", "pets"]),
        ];
        let hits = filter(&posts, ALL, "Volunteer");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Garden Planning Meeting");

        assert_eq!(filter(&posts, "Lost & Found", "pets").len(), 1);
        assert!(filter(&posts, "Events", "pets").is_empty());
    }

    #[test]
    fn test_directory_view_partitions_stably() {
        let records = directory();
        let view = DirectoryView::build(&records, &ListingFilter::default());
        assert_eq!(names(&view.featured), vec![
            "The Grind Coffee & Books",
            "Whispers Bookstore"
        ]);
        assert_eq!(names(&view.regular), vec!["Riverside Diner", "Sol City Hardware"]);
        assert_eq!(view.len(), 4);

        let view = DirectoryView::build(&records, &ListingFilter::new("Automotive", ""));
        assert!(view.is_empty());
    }
}
