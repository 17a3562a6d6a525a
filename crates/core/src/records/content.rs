//! News posts and events managed from the admin panel.
//!
//! Each record kind has a *draft* (what the admin form holds, plain strings)
//! and a *new* payload (what gets inserted). Drafts are validated locally so
//! an incomplete form never reaches the backend.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::types::{EventId, NewsPostId, UserId};

/// Errors raised while validating an admin form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The event date could not be understood.
    #[error("invalid event date: {0}")]
    InvalidDate(String),
}

/// Row in the `news_posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsPost {
    pub id: NewsPostId,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub author_id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for the `news_posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNewsPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub author_id: UserId,
    pub published: bool,
}

/// News form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
}

impl NewsDraft {
    /// Validate the form and turn it into an insert payload.
    ///
    /// Posts go live immediately; there is no draft state in the backend.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MissingField`] if the title or content is blank.
    pub fn validate(&self, author_id: UserId) -> Result<NewNewsPost, DraftError> {
        let title = required(&self.title, "title")?;
        let content = required(&self.content, "content")?;

        Ok(NewNewsPost {
            title,
            content,
            excerpt: optional(&self.excerpt),
            author_id,
            published: true,
        })
    }
}

/// Row in the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: DateTime<Utc>,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: DateTime<Utc>,
    pub author_id: UserId,
}

/// Event form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    /// RFC 3339 timestamp, `YYYY-MM-DDTHH:MM` (UTC) or `YYYY-MM-DD`.
    pub event_date: String,
}

impl EventDraft {
    /// Validate the form and turn it into an insert payload.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MissingField`] if the title or date is blank and
    /// [`DraftError::InvalidDate`] if the date does not parse.
    pub fn validate(&self, author_id: UserId) -> Result<NewEvent, DraftError> {
        let title = required(&self.title, "title")?;
        let raw_date = required(&self.event_date, "event date")?;
        let event_date = parse_event_date(&raw_date)?;

        Ok(NewEvent {
            title,
            description: optional(&self.description),
            location: optional(&self.location),
            event_date,
            author_id,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DraftError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse the date formats the admin form produces.
fn parse_event_date(raw: &str) -> Result<DateTime<Utc>, DraftError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DraftError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_news_draft_requires_title_and_content() {
        let author = UserId::random();
        let draft = NewsDraft {
            title: "Fair".to_string(),
            ..Default::default()
        };
        assert_eq!(
            draft.validate(author),
            Err(DraftError::MissingField("content"))
        );

        let draft = NewsDraft {
            title: "  ".to_string(),
            content: "Rides and pie".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.validate(author), Err(DraftError::MissingField("title")));
    }

    #[test]
    fn test_news_draft_publishes_immediately() {
        let author = UserId::random();
        let post = NewsDraft {
            title: "County Fair Returns".to_string(),
            content: "Rides and pie".to_string(),
            excerpt: String::new(),
        }
        .validate(author)
        .unwrap();

        assert!(post.published);
        assert_eq!(post.excerpt, None);
        assert_eq!(post.author_id, author);
    }

    #[test]
    fn test_event_draft_date_formats() {
        let author = UserId::random();
        let expected = Utc.with_ymd_and_hms(2025, 7, 4, 18, 30, 0).unwrap();

        for raw in ["2025-07-04T18:30:00Z", "2025-07-04T18:30", "2025-07-04T20:30:00+02:00"] {
            let draft = EventDraft {
                title: "Fireworks".to_string(),
                event_date: raw.to_string(),
                ..Default::default()
            };
            assert_eq!(draft.validate(author).unwrap().event_date, expected, "{raw}");
        }

        let draft = EventDraft {
            title: "Fireworks".to_string(),
            event_date: "2025-07-04".to_string(),
            ..Default::default()
        };
        assert_eq!(
            draft.validate(author).unwrap().event_date,
            Utc.with_ymd_and_hms(2025, 7, 4, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_event_draft_rejects_missing_or_bad_date() {
        let author = UserId::random();
        let mut draft = EventDraft {
            title: "Fireworks".to_string(),
            ..Default::default()
        };
        assert_eq!(
            draft.validate(author),
            Err(DraftError::MissingField("event date"))
        );

        draft.event_date = "next tuesday".to_string();
        assert_eq!(
            draft.validate(author),
            Err(DraftError::InvalidDate("next tuesday".to_string()))
        );
    }

    #[test]
    fn test_news_post_null_published_reads_false() {
        let json = r#"{
            "id": "3d5c7e9a-1b2c-4d3e-8f4a-5b6c7d8e9f01",
            "title": "Fair",
            "content": "Rides",
            "excerpt": null,
            "author_id": "0b7b1c44-3f0c-4e59-8d4e-4b9c7d0e2f01",
            "published": null,
            "created_at": "2025-06-01T12:00:00Z",
            "updated_at": "2025-06-01T12:00:00Z"
        }"#;
        let post: NewsPost = serde_json::from_str(json).unwrap();
        assert!(!post.published);
    }
}
