//! Repository traits (ports) for users, sessions, audit rows and schema DDL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::models::{AuditLogRecord, NewUser, Session, User};
use crate::logging::AuditEntry;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Conflict(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn create(&self, user: &NewUser) -> Result<User, StoreError>;
    /// Insert the admin, or refresh an existing row with the same e-mail.
    /// Returns the row and whether it was newly inserted.
    async fn upsert_admin(&self, user: &NewUser) -> Result<(User, bool), StoreError>;
    async fn update_password(
        &self,
        user_id: i32,
        password_hash: &str,
        first_login: bool,
    ) -> Result<(), StoreError>;
    async fn record_login(&self, user_id: i32, at: DateTime<Utc>) -> Result<(), StoreError>;
    async fn count_by_role(&self, role: &str) -> Result<i64, StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError>;
    async fn find_active(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError>;
    async fn delete(&self, token: &str) -> Result<bool, StoreError>;
    async fn delete_for_user(&self, user_id: i32) -> Result<u64, StoreError>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
    async fn count_active(&self, now: DateTime<Utc>) -> Result<i64, StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), StoreError>;
    async fn recent(&self, limit: i64) -> Result<Vec<AuditLogRecord>, StoreError>;
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    async fn execute(&self, statement: &str) -> Result<(), StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
    /// Names of the tables in the `public` schema.
    async fn existing_tables(&self) -> Result<Vec<String>, StoreError>;
}
