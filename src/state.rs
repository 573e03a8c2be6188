use std::sync::Arc;

use sqlx::PgPool;

use crate::repo::memory::{
    MemContentRepo, MemPathwayRepo, MemProgressRepo, MemUserRepo, MemoryStore,
};
use crate::repo::postgres::{PgContentRepo, PgPathwayRepo, PgProgressRepo, PgUserRepo};
use crate::repo::{ContentRepo, PathwayRepo, ProgressRepo, UserRepo};

/// Per-process handles to the repository implementations.
///
/// Handlers construct the domain services per request from these handles;
/// nothing else is shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub pathways: Arc<dyn PathwayRepo>,
    pub content: Arc<dyn ContentRepo>,
    pub progress: Arc<dyn ProgressRepo>,
}

impl AppState {
    /// Production wiring: every repository backed by the given pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepo::new(pool.clone())),
            pathways: Arc::new(PgPathwayRepo::new(pool.clone())),
            content: Arc::new(PgContentRepo::new(pool.clone())),
            progress: Arc::new(PgProgressRepo::new(pool)),
        }
    }

    /// In-process wiring over a shared store; used by the test suites and
    /// as a database-free dev backend.
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(MemUserRepo::new(store.clone())),
            pathways: Arc::new(MemPathwayRepo::new(store.clone())),
            content: Arc::new(MemContentRepo::new(store.clone())),
            progress: Arc::new(MemProgressRepo::new(store)),
        }
    }
}
