use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use tracing::{debug, error, info};

use super::models::{AuditLogRecord, NewUser, Session, User};
use super::repository::{
    AuditRepository, SchemaRepository, SessionRepository, StoreError, UserRepository,
};
use super::DbPool;
use crate::logging::AuditEntry;

const USER_COLUMNS: &str = "id, email, display_name, password_hash, role, is_active, \
                            first_login, last_login_at, created_at, updated_at";

pub struct PgRepository {
    pool: DbPool,
}

impl PgRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UpsertedUser {
    #[sqlx(flatten)]
    user: User,
    inserted: bool,
}

fn map_unique_violation(e: sqlx::Error, conflict: impl FnOnce() -> String) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(conflict()),
        _ => {
            error!("Database error: {}", e);
            StoreError::Database(e)
        }
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(user)
    }

    async fn create(&self, user: &NewUser) -> Result<User, StoreError> {
        info!("Creating user with email: {}", user.email);

        sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (email, display_name, password_hash, role, is_active, first_login)
               VALUES ($1, $2, $3, $4, TRUE, $5)
               RETURNING {}"#,
            USER_COLUMNS
        ))
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.first_login)
        .fetch_one(self.pool.get_pool())
        .await
        .map_err(|e| map_unique_violation(e, || format!("Email already registered: {}", user.email)))
    }

    async fn upsert_admin(&self, user: &NewUser) -> Result<(User, bool), StoreError> {
        let row = sqlx::query_as::<_, UpsertedUser>(&format!(
            r#"INSERT INTO users (email, display_name, password_hash, role, is_active, first_login)
               VALUES ($1, $2, $3, $4, TRUE, $5)
               ON CONFLICT (email) DO UPDATE
               SET password_hash = EXCLUDED.password_hash,
                   role = EXCLUDED.role,
                   is_active = TRUE,
                   updated_at = NOW()
               RETURNING {}, (xmax = 0) AS inserted"#,
            USER_COLUMNS
        ))
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.first_login)
        .fetch_one(self.pool.get_pool())
        .await?;

        Ok((row.user, row.inserted))
    }

    async fn update_password(
        &self,
        user_id: i32,
        password_hash: &str,
        first_login: bool,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE users
               SET password_hash = $2, first_login = $3, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(first_login)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn record_login(&self, user_id: i32, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(user_id)
            .bind(at)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    async fn count_by_role(&self, role: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(self.pool.get_pool())
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl SessionRepository for PgRepository {
    async fn create(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"INSERT INTO sessions (user_id, token, expires_at)
               VALUES ($1, $2, $3)
               RETURNING id, user_id, token, expires_at, created_at"#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(self.pool.get_pool())
        .await?;

        debug!("Session {} created for user {}", session.id, user_id);
        Ok(session)
    }

    async fn find_active(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"SELECT id, user_id, token, expires_at, created_at
               FROM sessions
               WHERE token = $1 AND expires_at > $2"#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(session)
    }

    async fn delete(&self, token: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: i32) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_active(&self, now: DateTime<Utc>) -> Result<i64, StoreError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions WHERE expires_at > $1")
                .bind(now)
                .fetch_one(self.pool.get_pool())
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl AuditRepository for PgRepository {
    async fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO audit_logs (user_id, action, category, details, success)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.category)
        .bind(Json(entry.details.clone()))
        .bind(entry.success)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<AuditLogRecord>, StoreError> {
        let rows = sqlx::query_as::<_, AuditLogRecord>(
            r#"SELECT id, user_id, action, category, details, success, created_at
               FROM audit_logs
               ORDER BY created_at DESC, id DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(rows)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM audit_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SchemaRepository for PgRepository {
    async fn execute(&self, statement: &str) -> Result<(), StoreError> {
        sqlx::raw_sql(statement)
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn existing_tables(&self) -> Result<Vec<String>, StoreError> {
        let tables = sqlx::query_scalar::<_, String>(
            r#"SELECT table_name::text
               FROM information_schema.tables
               WHERE table_schema = 'public'
               ORDER BY table_name"#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(tables)
    }
}
