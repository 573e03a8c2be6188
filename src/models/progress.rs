use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Completion state of a user on a pathway.
/// Corresponds to the `progress_state` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "progress_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    NotStarted,
    InProgress,
    Complete,
}

impl ProgressState {
    fn rank(self) -> u8 {
        match self {
            ProgressState::NotStarted => 0,
            ProgressState::InProgress => 1,
            ProgressState::Complete => 2,
        }
    }

    /// State transitions are monotonic: not_started -> in_progress -> complete.
    /// Re-asserting the current state is allowed; moving backwards requires an
    /// explicit admin reset.
    pub fn can_advance_to(self, next: ProgressState) -> bool {
        next.rank() >= self.rank()
    }
}

/// Association of a user with a pathway and their completion state.
/// At most one active record exists per (user, pathway) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgressRecord {
    /// Unique identifier (UUID v4).
    pub id: Uuid,
    pub user_id: i32,
    pub pathway_id: Uuid,
    pub state: ProgressState,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn new(user_id: i32, pathway_id: Uuid, state: ProgressState) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            pathway_id,
            state,
            updated_at: Utc::now(),
        }
    }
}

/// Payload for `PUT /api/progress`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProgressInput {
    pub pathway_id: Uuid,
    pub state: ProgressState,
}

/// Payload for the admin-only `POST /api/progress/reset`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ResetRequest {
    pub user_id: i32,
    pub pathway_id: Uuid,
}
