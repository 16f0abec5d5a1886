pub mod models;
pub mod pool;
pub mod postgres;
pub mod repository;
pub mod schema;

#[cfg(test)]
pub mod memory;

use std::sync::Arc;

pub use models::*;
pub use pool::DbPool;
pub use postgres::PgRepository;
pub use repository::{
    AuditRepository, SchemaRepository, SessionRepository, StoreError, UserRepository,
};

/// The four repositories handlers work against.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub schema: Arc<dyn SchemaRepository>,
}

impl Stores {
    pub fn postgres(pool: DbPool) -> Self {
        let repo = Arc::new(PgRepository::new(pool));
        Self {
            users: repo.clone(),
            sessions: repo.clone(),
            audit: repo.clone(),
            schema: repo,
        }
    }
}
