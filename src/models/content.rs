use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Kind of learning material a content item carries.
/// Corresponds to the `content_kind` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "content_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Inline prose held in `body`.
    Text,
    /// External resource referenced by `url`.
    Link,
    /// An exercise prompt, described in `body`.
    Exercise,
}

/// A unit of learning material belonging to exactly one pathway.
///
/// Positions are 0-based, contiguous, and unique within a pathway; insertion
/// and removal re-index the trailing items to keep that invariant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentItem {
    /// Unique identifier (UUID v4).
    pub id: Uuid,
    pub pathway_id: Uuid,
    pub position: i32,
    pub kind: ContentKind,
    pub title: String,
    pub body: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input structure for adding a content item to a pathway.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ContentInput {
    pub kind: ContentKind,

    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 10000 characters if provided.
    #[validate(length(max = 10000))]
    pub body: Option<String>,

    #[validate(url)]
    pub url: Option<String>,

    /// 0-based insertion index; must not exceed the current item count.
    pub position: i32,
}

/// Field update for an existing content item. Position is not moved by
/// this payload; reordering is remove-and-reinsert.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ContentUpdate {
    pub kind: ContentKind,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 10000))]
    pub body: Option<String>,

    #[validate(url)]
    pub url: Option<String>,
}

impl ContentItem {
    /// Creates a new `ContentItem` from input, bound to `pathway_id` at
    /// `position`.
    pub fn new(input: ContentInput, pathway_id: Uuid, position: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            pathway_id,
            position,
            kind: input.kind,
            title: input.title,
            body: input.body,
            url: input.url,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_creation() {
        let input = ContentInput {
            kind: ContentKind::Link,
            title: "Reference manual".to_string(),
            body: None,
            url: Some("https://example.com/manual".to_string()),
            position: 0,
        };

        let pathway_id = Uuid::new_v4();
        let item = ContentItem::new(input, pathway_id, 3);
        assert_eq!(item.pathway_id, pathway_id);
        assert_eq!(item.position, 3);
        assert_eq!(item.kind, ContentKind::Link);
    }

    #[test]
    fn test_content_input_validation() {
        let valid = ContentInput {
            kind: ContentKind::Text,
            title: "Lesson 1".to_string(),
            body: Some("Read this first.".to_string()),
            url: None,
            position: 0,
        };
        assert!(valid.validate().is_ok());

        let empty_title = ContentInput {
            kind: ContentKind::Text,
            title: "".to_string(),
            body: None,
            url: None,
            position: 0,
        };
        assert!(empty_title.validate().is_err());

        let bad_url = ContentInput {
            kind: ContentKind::Link,
            title: "Broken".to_string(),
            body: None,
            url: Some("not a url".to_string()),
            position: 0,
        };
        assert!(bad_url.validate().is_err());
    }
}
