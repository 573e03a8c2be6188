//! In-process repositories over `RwLock`-guarded maps.
//!
//! Mirrors the semantics of the PostgreSQL backend (soft deletes, contiguous
//! content positions, one active progress record per pair) without needing a
//! database. The integration test suites run entirely against this backend;
//! it also serves as a zero-dependency dev backend.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ContentItem, NewUser, Pathway, PathwayQuery, ProgressRecord, User};
use crate::repo::{ContentRepo, PathwayRepo, ProgressRepo, UserRepo};

#[derive(Default)]
struct UserTable {
    rows: HashMap<i32, User>,
    next_id: i32,
}

/// Shared backing store. The pathway repository needs to reach the content
/// and progress tables for its delete cascade, so all tables live together
/// and the per-entity repositories hold an `Arc` to the whole store.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<UserTable>,
    // bool flags mark soft-deleted rows.
    pathways: RwLock<HashMap<Uuid, (Pathway, bool)>>,
    content: RwLock<HashMap<Uuid, (ContentItem, bool)>>,
    progress: RwLock<HashMap<Uuid, (ProgressRecord, bool)>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn lock_error<T>(_: T) -> AppError {
    AppError::InternalServerError("memory store lock poisoned".into())
}

#[derive(Clone)]
pub struct MemUserRepo {
    store: Arc<MemoryStore>,
}

impl MemUserRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepo for MemUserRepo {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut table = self.store.users.write().map_err(lock_error)?;

        if table.rows.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("Username already taken".into()));
        }
        if table.rows.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        table.next_id += 1;
        let created = User {
            id: table.next_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_active: true,
            created_at: chrono::Utc::now(),
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let table = self.store.users.read().map_err(lock_error)?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let table = self.store.users.read().map_err(lock_error)?;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let table = self.store.users.read().map_err(lock_error)?;
        Ok(table
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        let mut table = self.store.users.write().map_err(lock_error)?;

        if table
            .rows
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        match table.rows.get_mut(&user.id) {
            Some(existing) => {
                existing.email = user.email.clone();
                existing.password_hash = user.password_hash.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("User not found".into())),
        }
    }

    async fn deactivate(&self, id: i32) -> Result<(), AppError> {
        let mut table = self.store.users.write().map_err(lock_error)?;
        match table.rows.get_mut(&id) {
            Some(user) => {
                user.is_active = false;
                Ok(())
            }
            None => Err(AppError::NotFound("User not found".into())),
        }
    }
}

#[derive(Clone)]
pub struct MemPathwayRepo {
    store: Arc<MemoryStore>,
}

impl MemPathwayRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PathwayRepo for MemPathwayRepo {
    async fn insert(&self, pathway: &Pathway) -> Result<(), AppError> {
        let mut rows = self.store.pathways.write().map_err(lock_error)?;
        rows.insert(pathway.id, (pathway.clone(), false));
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pathway>, AppError> {
        let rows = self.store.pathways.read().map_err(lock_error)?;
        Ok(rows
            .get(&id)
            .filter(|(_, deleted)| !deleted)
            .map(|(p, _)| p.clone()))
    }

    async fn list(&self, viewer: i32, query: &PathwayQuery) -> Result<Vec<Pathway>, AppError> {
        let rows = self.store.pathways.read().map_err(lock_error)?;

        let mut matching: Vec<Pathway> = rows
            .values()
            .filter(|(_, deleted)| !deleted)
            .map(|(p, _)| p)
            .filter(|p| p.visible_to(viewer))
            .filter(|p| query.owner.map_or(true, |owner| p.owner_id == owner))
            .filter(|p| query.visibility.map_or(true, |v| p.visibility == v))
            .filter(|p| {
                query.search.as_ref().map_or(true, |term| {
                    let term = term.to_lowercase();
                    p.title.to_lowercase().contains(&term)
                        || p.description
                            .as_ref()
                            .map_or(false, |d| d.to_lowercase().contains(&term))
                })
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let limit = query.limit.unwrap_or(50).clamp(1, 100) as usize;
        let offset = query.offset.unwrap_or(0).max(0) as usize;
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn update(&self, pathway: &Pathway) -> Result<(), AppError> {
        let mut rows = self.store.pathways.write().map_err(lock_error)?;
        match rows.get_mut(&pathway.id) {
            Some((existing, false)) => {
                *existing = pathway.clone();
                Ok(())
            }
            _ => Err(AppError::NotFound("Pathway not found".into())),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut rows = self.store.pathways.write().map_err(lock_error)?;
        match rows.get_mut(&id) {
            Some((_, deleted)) if !*deleted => *deleted = true,
            _ => return Err(AppError::NotFound("Pathway not found".into())),
        }
        drop(rows);

        // Cascade to content items and progress records.
        let mut content = self.store.content.write().map_err(lock_error)?;
        for (item, deleted) in content.values_mut() {
            if item.pathway_id == id {
                *deleted = true;
            }
        }
        drop(content);

        let mut progress = self.store.progress.write().map_err(lock_error)?;
        for (record, deleted) in progress.values_mut() {
            if record.pathway_id == id {
                *deleted = true;
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MemContentRepo {
    store: Arc<MemoryStore>,
}

impl MemContentRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ContentRepo for MemContentRepo {
    async fn insert_at(&self, item: ContentItem) -> Result<ContentItem, AppError> {
        let mut rows = self.store.content.write().map_err(lock_error)?;

        let count = rows
            .values()
            .filter(|(c, deleted)| !deleted && c.pathway_id == item.pathway_id)
            .count() as i64;

        if item.position < 0 || i64::from(item.position) > count {
            return Err(AppError::InvalidPosition(format!(
                "Position {} out of bounds (0..={})",
                item.position, count
            )));
        }

        for (existing, deleted) in rows.values_mut() {
            if !*deleted
                && existing.pathway_id == item.pathway_id
                && existing.position >= item.position
            {
                existing.position += 1;
            }
        }

        rows.insert(item.id, (item.clone(), false));
        Ok(item)
    }

    async fn list_for_pathway(&self, pathway_id: Uuid) -> Result<Vec<ContentItem>, AppError> {
        let rows = self.store.content.read().map_err(lock_error)?;
        let mut items: Vec<ContentItem> = rows
            .values()
            .filter(|(c, deleted)| !deleted && c.pathway_id == pathway_id)
            .map(|(c, _)| c.clone())
            .collect();
        items.sort_by_key(|c| c.position);
        Ok(items)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, AppError> {
        let rows = self.store.content.read().map_err(lock_error)?;
        Ok(rows
            .get(&id)
            .filter(|(_, deleted)| !deleted)
            .map(|(c, _)| c.clone()))
    }

    async fn count_for_pathway(&self, pathway_id: Uuid) -> Result<i64, AppError> {
        let rows = self.store.content.read().map_err(lock_error)?;
        Ok(rows
            .values()
            .filter(|(c, deleted)| !deleted && c.pathway_id == pathway_id)
            .count() as i64)
    }

    async fn update(&self, item: &ContentItem) -> Result<(), AppError> {
        let mut rows = self.store.content.write().map_err(lock_error)?;
        match rows.get_mut(&item.id) {
            Some((existing, false)) => {
                existing.kind = item.kind;
                existing.title = item.title.clone();
                existing.body = item.body.clone();
                existing.url = item.url.clone();
                Ok(())
            }
            _ => Err(AppError::NotFound("Content item not found".into())),
        }
    }

    async fn remove(&self, pathway_id: Uuid, content_id: Uuid) -> Result<(), AppError> {
        let mut rows = self.store.content.write().map_err(lock_error)?;

        let position = match rows.get_mut(&content_id) {
            Some((item, deleted)) if !*deleted && item.pathway_id == pathway_id => {
                *deleted = true;
                item.position
            }
            _ => return Err(AppError::NotFound("Content item not found".into())),
        };

        // Close the gap so positions stay contiguous.
        for (item, deleted) in rows.values_mut() {
            if !*deleted && item.pathway_id == pathway_id && item.position > position {
                item.position -= 1;
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MemProgressRepo {
    store: Arc<MemoryStore>,
}

impl MemProgressRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProgressRepo for MemProgressRepo {
    async fn find(
        &self,
        user_id: i32,
        pathway_id: Uuid,
    ) -> Result<Option<ProgressRecord>, AppError> {
        let rows = self.store.progress.read().map_err(lock_error)?;
        Ok(rows
            .values()
            .filter(|(_, deleted)| !deleted)
            .map(|(r, _)| r)
            .find(|r| r.user_id == user_id && r.pathway_id == pathway_id)
            .cloned())
    }

    async fn upsert(&self, record: ProgressRecord) -> Result<ProgressRecord, AppError> {
        let mut rows = self.store.progress.write().map_err(lock_error)?;

        // Replace the existing active record in place so the pair invariant
        // holds; otherwise insert a fresh row.
        let existing_id = rows
            .values()
            .filter(|(_, deleted)| !deleted)
            .map(|(r, _)| r)
            .find(|r| r.user_id == record.user_id && r.pathway_id == record.pathway_id)
            .map(|r| r.id);

        match existing_id {
            Some(id) => {
                let (existing, _) = rows.get_mut(&id).expect("record present");
                existing.state = record.state;
                existing.updated_at = record.updated_at;
                Ok(existing.clone())
            }
            None => {
                rows.insert(record.id, (record.clone(), false));
                Ok(record)
            }
        }
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<ProgressRecord>, AppError> {
        let rows = self.store.progress.read().map_err(lock_error)?;
        let mut records: Vec<ProgressRecord> = rows
            .values()
            .filter(|(r, deleted)| !deleted && r.user_id == user_id)
            .map(|(r, _)| r.clone())
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}
