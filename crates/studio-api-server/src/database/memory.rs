//! In-memory repositories for handler and service tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use super::models::{AuditLogRecord, NewUser, Session, User};
use super::repository::{
    AuditRepository, SchemaRepository, SessionRepository, StoreError, UserRepository,
};
use super::Stores;
use crate::logging::AuditEntry;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    sessions: Vec<Session>,
    audit: Vec<AuditLogRecord>,
    tables: BTreeSet<String>,
    failing_statements: Vec<String>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_table(&self, table: &str) -> Result<(), StoreError> {
        if self.tables.contains(table) {
            Ok(())
        } else {
            Err(StoreError::Database(sqlx::Error::Protocol(format!(
                "relation \"{}\" does not exist",
                table
            ))))
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Store whose schema has already been applied.
    pub fn with_schema() -> Arc<Self> {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().unwrap();
            for table in crate::database::schema::REQUIRED_TABLES {
                inner.tables.insert(table.to_string());
            }
        }
        Arc::new(store)
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stores(self: &Arc<Self>) -> Stores {
        Stores {
            users: self.clone(),
            sessions: self.clone(),
            audit: self.clone(),
            schema: self.clone(),
        }
    }

    /// Any statement containing `fragment` fails from now on.
    pub fn fail_statements_containing(&self, fragment: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_statements
            .push(fragment.to_string());
    }

    pub fn users(&self) -> Vec<User> {
        self.inner.lock().unwrap().users.clone()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.inner.lock().unwrap().sessions.clone()
    }

    pub fn audit_entries(&self) -> Vec<AuditLogRecord> {
        self.inner.lock().unwrap().audit.clone()
    }

    pub fn insert_session(&self, user_id: i32, token: &str, expires_at: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id() as i32;
        inner.sessions.push(Session {
            id,
            user_id,
            token: token.to_string(),
            expires_at,
            created_at: Utc::now(),
        });
    }

    pub fn insert_audit_at(&self, entry: &AuditEntry, created_at: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.audit.push(record_from(entry, id, created_at));
    }

    pub fn set_active(&self, email: &str, active: bool) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.users.iter_mut().find(|u| u.email == email) {
            row.is_active = active;
        }
    }
}

fn record_from(entry: &AuditEntry, id: i64, created_at: DateTime<Utc>) -> AuditLogRecord {
    AuditLogRecord {
        id,
        user_id: entry.user_id,
        action: entry.action.clone(),
        category: entry.category.clone(),
        details: Json(entry.details.clone()),
        success: entry.success,
        created_at,
    }
}

fn table_created_by(statement: &str) -> Option<String> {
    let rest = statement.split("CREATE TABLE IF NOT EXISTS").nth(1)?;
    rest.split(|c: char| c.is_whitespace() || c == '(')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.require_table("users")?;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.require_table("users")?;
        Ok(inner
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.require_table("users")?;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "Email already registered: {}",
                user.email
            )));
        }

        let now = Utc::now();
        let row = User {
            id: inner.next_id() as i32,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_string(),
            is_active: true,
            first_login: user.first_login,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(row.clone());
        Ok(row)
    }

    async fn upsert_admin(&self, user: &NewUser) -> Result<(User, bool), StoreError> {
        let existing = {
            let mut inner = self.inner.lock().unwrap();
            inner.require_table("users")?;
            match inner.users.iter_mut().find(|u| u.email == user.email) {
                Some(row) => {
                    row.password_hash = user.password_hash.clone();
                    row.role = user.role.as_str().to_string();
                    row.is_active = true;
                    row.updated_at = Utc::now();
                    Some(row.clone())
                }
                None => None,
            }
        };

        match existing {
            Some(row) => Ok((row, false)),
            None => UserRepository::create(self, user).await.map(|row| (row, true)),
        }
    }

    async fn update_password(
        &self,
        user_id: i32,
        password_hash: &str,
        first_login: bool,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.users.iter_mut().find(|u| u.id == user_id) {
            row.password_hash = password_hash.to_string();
            row.first_login = first_login;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn record_login(&self, user_id: i32, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.users.iter_mut().find(|u| u.id == user_id) {
            row.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn count_by_role(&self, role: &str) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.require_table("users")?;
        Ok(inner.users.iter().filter(|u| u.role == role).count() as i64)
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.require_table("sessions")?;
        let session = Session {
            id: inner.next_id() as i32,
            user_id,
            token: token.to_string(),
            expires_at,
            created_at: Utc::now(),
        };
        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_active(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.require_table("sessions")?;
        Ok(inner
            .sessions
            .iter()
            .find(|s| s.token == token && s.expires_at > now)
            .cloned())
    }

    async fn delete(&self, token: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.token != token);
        Ok(inner.sessions.len() < before)
    }

    async fn delete_for_user(&self, user_id: i32) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.user_id != user_id);
        Ok((before - inner.sessions.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.require_table("sessions")?;
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.expires_at >= now);
        Ok((before - inner.sessions.len()) as u64)
    }

    async fn count_active(&self, now: DateTime<Utc>) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.require_table("sessions")?;
        Ok(inner.sessions.iter().filter(|s| s.expires_at > now).count() as i64)
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.require_table("audit_logs")?;
        let id = inner.next_id();
        inner.audit.push(record_from(entry, id, Utc::now()));
        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<AuditLogRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows = inner.audit.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.require_table("audit_logs")?;
        let before = inner.audit.len();
        inner.audit.retain(|r| r.created_at >= cutoff);
        Ok((before - inner.audit.len()) as u64)
    }
}

#[async_trait]
impl SchemaRepository for MemoryStore {
    async fn execute(&self, statement: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .failing_statements
            .iter()
            .any(|fragment| statement.contains(fragment.as_str()))
        {
            return Err(StoreError::Database(sqlx::Error::Protocol(
                "permission denied for schema public".to_string(),
            )));
        }

        if let Some(table) = table_created_by(statement) {
            inner.tables.insert(table);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn existing_tables(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.inner.lock().unwrap().tables.iter().cloned().collect())
    }
}
