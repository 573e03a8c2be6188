use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::progress::ProgressState;

/// Who may read a pathway besides its owner.
/// Corresponds to the `pathway_visibility` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "pathway_visibility", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Only the owner can see the pathway.
    Private,
    /// Any authenticated user can see the pathway and track progress on it.
    Public,
}

/// A named, ordered learning journey owned by a single user.
///
/// Soft-deleted rows (non-null `deleted_at`) are excluded from every read,
/// so the struct does not carry the column.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pathway {
    /// Unique identifier (UUID v4).
    pub id: Uuid,
    /// Identifier of the owning user.
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating or updating a pathway.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PathwayInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 2000 characters if provided.
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// Defaults to private when omitted.
    pub visibility: Option<Visibility>,
}

/// Query parameters accepted by the pathway listing endpoint.
///
/// `limit`/`offset` make the listing a restartable sequence; results are
/// always ordered by creation time descending.
#[derive(Debug, Serialize, Deserialize)]
pub struct PathwayQuery {
    /// Restrict to pathways owned by this user id.
    pub owner: Option<i32>,
    pub visibility: Option<Visibility>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A pathway as returned by the listing endpoint: the row itself plus the
/// number of content items and the calling user's progress state, if any.
#[derive(Debug, Serialize, Deserialize)]
pub struct PathwaySummary {
    #[serde(flatten)]
    pub pathway: Pathway,
    pub content_count: i64,
    pub progress: Option<ProgressState>,
}

impl Pathway {
    /// Creates a new `Pathway` from `PathwayInput` and the owner's user id.
    /// Visibility defaults to private; timestamps are set to now.
    pub fn new(input: PathwayInput, owner_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title,
            description: input.description,
            visibility: input.visibility.unwrap_or(Visibility::Private),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` is allowed to read this pathway.
    pub fn visible_to(&self, user_id: i32) -> bool {
        self.owner_id == user_id || self.visibility == Visibility::Public
    }
}
