//! PostgreSQL repositories backed by sqlx.
//!
//! All queries are runtime-checked and fully parameterized. Multi-statement
//! writes (position re-indexing, delete cascades) run inside a single
//! transaction.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ContentItem, NewUser, Pathway, PathwayQuery, ProgressRecord, User};
use crate::repo::{ContentRepo, PathwayRepo, ProgressRepo, UserRepo};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, is_active, created_at";
const PATHWAY_COLUMNS: &str = "id, owner_id, title, description, visibility, created_at, updated_at";
const CONTENT_COLUMNS: &str = "id, pathway_id, position, kind, title, body, url, created_at";
const PROGRESS_COLUMNS: &str = "id, user_id, pathway_id, state, updated_at";

#[derive(Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        // The unique constraints on username/email backstop the service-level
        // pre-check; 23505 maps to Conflict in From<sqlx::Error>.
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET email = $1, password_hash = $2 WHERE id = $3")
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn deactivate(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgPathwayRepo {
    pool: PgPool,
}

impl PgPathwayRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PathwayRepo for PgPathwayRepo {
    async fn insert(&self, pathway: &Pathway) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO pathways (id, owner_id, title, description, visibility, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(pathway.id)
        .bind(pathway.owner_id)
        .bind(&pathway.title)
        .bind(&pathway.description)
        .bind(pathway.visibility)
        .bind(pathway.created_at)
        .bind(pathway.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pathway>, AppError> {
        let pathway = sqlx::query_as::<_, Pathway>(&format!(
            "SELECT {PATHWAY_COLUMNS} FROM pathways WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pathway)
    }

    async fn list(&self, viewer: i32, query: &PathwayQuery) -> Result<Vec<Pathway>, AppError> {
        // Base query restricts to active rows the viewer may see; filter
        // conditions are appended dynamically, every value bound.
        let mut sql = format!(
            "SELECT {PATHWAY_COLUMNS} FROM pathways \
             WHERE deleted_at IS NULL AND (owner_id = $1 OR visibility = 'public')"
        );
        let mut param_count = 2;

        if query.owner.is_some() {
            sql.push_str(&format!(" AND owner_id = ${}", param_count));
            param_count += 1;
        }
        if query.visibility.is_some() {
            sql.push_str(&format!(" AND visibility = ${}", param_count));
            param_count += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${} OR description ILIKE ${})",
                param_count,
                param_count + 1
            ));
            param_count += 2;
        }

        sql.push_str(&format!(
            " ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            param_count,
            param_count + 1
        ));

        let mut query_builder = sqlx::query_as::<_, Pathway>(&sql).bind(viewer);

        if let Some(owner) = query.owner {
            query_builder = query_builder.bind(owner);
        }
        if let Some(visibility) = query.visibility {
            query_builder = query_builder.bind(visibility);
        }
        if let Some(search) = &query.search {
            let search_pattern = format!("%{}%", search);
            query_builder = query_builder.bind(search_pattern.clone());
            query_builder = query_builder.bind(search_pattern);
        }

        let limit = query.limit.unwrap_or(50).clamp(1, 100);
        let offset = query.offset.unwrap_or(0).max(0);
        query_builder = query_builder.bind(limit).bind(offset);

        let pathways = query_builder.fetch_all(&self.pool).await?;
        Ok(pathways)
    }

    async fn update(&self, pathway: &Pathway) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE pathways
             SET title = $1, description = $2, visibility = $3, updated_at = $4
             WHERE id = $5 AND deleted_at IS NULL",
        )
        .bind(&pathway.title)
        .bind(&pathway.description)
        .bind(pathway.visibility)
        .bind(pathway.updated_at)
        .bind(pathway.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pathway not found".into()));
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE pathways SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pathway not found".into()));
        }

        sqlx::query(
            "UPDATE content_items SET deleted_at = NOW()
             WHERE pathway_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE progress_records SET deleted_at = NOW()
             WHERE pathway_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgContentRepo {
    pool: PgPool,
}

impl PgContentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepo for PgContentRepo {
    async fn insert_at(&self, item: ContentItem) -> Result<ContentItem, AppError> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM content_items WHERE pathway_id = $1 AND deleted_at IS NULL",
        )
        .bind(item.pathway_id)
        .fetch_one(&mut *tx)
        .await?;

        if item.position < 0 || i64::from(item.position) > count {
            return Err(AppError::InvalidPosition(format!(
                "Position {} out of bounds (0..={})",
                item.position, count
            )));
        }

        sqlx::query(
            "UPDATE content_items SET position = position + 1
             WHERE pathway_id = $1 AND deleted_at IS NULL AND position >= $2",
        )
        .bind(item.pathway_id)
        .bind(item.position)
        .execute(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, ContentItem>(&format!(
            "INSERT INTO content_items (id, pathway_id, position, kind, title, body, url, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(item.id)
        .bind(item.pathway_id)
        .bind(item.position)
        .bind(item.kind)
        .bind(&item.title)
        .bind(&item.body)
        .bind(&item.url)
        .bind(item.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_for_pathway(&self, pathway_id: Uuid) -> Result<Vec<ContentItem>, AppError> {
        let items = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items
             WHERE pathway_id = $1 AND deleted_at IS NULL
             ORDER BY position"
        ))
        .bind(pathway_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, AppError> {
        let item = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn count_for_pathway(&self, pathway_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM content_items WHERE pathway_id = $1 AND deleted_at IS NULL",
        )
        .bind(pathway_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update(&self, item: &ContentItem) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE content_items SET kind = $1, title = $2, body = $3, url = $4
             WHERE id = $5 AND deleted_at IS NULL",
        )
        .bind(item.kind)
        .bind(&item.title)
        .bind(&item.body)
        .bind(&item.url)
        .bind(item.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Content item not found".into()));
        }
        Ok(())
    }

    async fn remove(&self, pathway_id: Uuid, content_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let position: Option<i32> = sqlx::query_scalar(
            "SELECT position FROM content_items
             WHERE id = $1 AND pathway_id = $2 AND deleted_at IS NULL",
        )
        .bind(content_id)
        .bind(pathway_id)
        .fetch_optional(&mut *tx)
        .await?;

        let position = match position {
            Some(p) => p,
            None => return Err(AppError::NotFound("Content item not found".into())),
        };

        sqlx::query("UPDATE content_items SET deleted_at = NOW() WHERE id = $1")
            .bind(content_id)
            .execute(&mut *tx)
            .await?;

        // Close the gap so positions stay contiguous.
        sqlx::query(
            "UPDATE content_items SET position = position - 1
             WHERE pathway_id = $1 AND deleted_at IS NULL AND position > $2",
        )
        .bind(pathway_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgProgressRepo {
    pool: PgPool,
}

impl PgProgressRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepo for PgProgressRepo {
    async fn find(
        &self,
        user_id: i32,
        pathway_id: Uuid,
    ) -> Result<Option<ProgressRecord>, AppError> {
        let record = sqlx::query_as::<_, ProgressRecord>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress_records
             WHERE user_id = $1 AND pathway_id = $2 AND deleted_at IS NULL"
        ))
        .bind(user_id)
        .bind(pathway_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert(&self, record: ProgressRecord) -> Result<ProgressRecord, AppError> {
        // The partial unique index on active (user_id, pathway_id) pairs is
        // the conflict target, so at most one active record can ever exist.
        let saved = sqlx::query_as::<_, ProgressRecord>(&format!(
            "INSERT INTO progress_records (id, user_id, pathway_id, state, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, pathway_id) WHERE deleted_at IS NULL
             DO UPDATE SET state = EXCLUDED.state, updated_at = EXCLUDED.updated_at
             RETURNING {PROGRESS_COLUMNS}"
        ))
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.pathway_id)
        .bind(record.state)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<ProgressRecord>, AppError> {
        let records = sqlx::query_as::<_, ProgressRecord>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress_records
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY updated_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
