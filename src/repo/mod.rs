//! Repository interfaces over the persistence layer.
//!
//! One trait per entity; each implementation owns its query and transaction
//! logic. The domain services depend only on these traits, never on a
//! concrete backend: `postgres` is the production implementation, `memory`
//! backs the test suites.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ContentItem, NewUser, Pathway, PathwayQuery, ProgressRecord, User};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts a new account. Fails with `Conflict` if the username or email
    /// is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// Persists changed email/password hash. Fails with `Conflict` if the new
    /// email collides with another account.
    async fn update(&self, user: &User) -> Result<(), AppError>;
    /// Soft-deactivation; the row is kept for referential history.
    async fn deactivate(&self, id: i32) -> Result<(), AppError>;
}

#[async_trait]
pub trait PathwayRepo: Send + Sync {
    async fn insert(&self, pathway: &Pathway) -> Result<(), AppError>;
    /// Soft-deleted pathways are treated as absent by every read.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pathway>, AppError>;
    /// Pathways visible to `viewer` (their own plus public ones), filtered by
    /// `query`, newest first.
    async fn list(&self, viewer: i32, query: &PathwayQuery) -> Result<Vec<Pathway>, AppError>;
    async fn update(&self, pathway: &Pathway) -> Result<(), AppError>;
    /// Soft-deletes the pathway and cascades to its content items and
    /// progress records, atomically.
    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// Inserts `item` at `item.position`, shifting trailing items up by one.
    /// Fails with `InvalidPosition` unless `0 <= position <= item count`;
    /// the bounds check and the shift happen in one transaction.
    async fn insert_at(&self, item: ContentItem) -> Result<ContentItem, AppError>;
    /// Active items of a pathway ordered by position.
    async fn list_for_pathway(&self, pathway_id: Uuid) -> Result<Vec<ContentItem>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, AppError>;
    async fn count_for_pathway(&self, pathway_id: Uuid) -> Result<i64, AppError>;
    /// Field update; the item's position is left untouched.
    async fn update(&self, item: &ContentItem) -> Result<(), AppError>;
    /// Removes an item from a pathway and shifts trailing positions down so
    /// the sequence stays contiguous. Fails with `NotFound` if the item is
    /// not part of the pathway.
    async fn remove(&self, pathway_id: Uuid, content_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProgressRepo: Send + Sync {
    /// The single active record for the pair, if any.
    async fn find(&self, user_id: i32, pathway_id: Uuid)
        -> Result<Option<ProgressRecord>, AppError>;
    /// Inserts or replaces the active record for `(user_id, pathway_id)`.
    async fn upsert(&self, record: ProgressRecord) -> Result<ProgressRecord, AppError>;
    /// All active records of a user, most recently updated first.
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<ProgressRecord>, AppError>;
}
