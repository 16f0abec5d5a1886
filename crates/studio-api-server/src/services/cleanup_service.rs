use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::database::{AuditRepository, SessionRepository, Stores};
use crate::logging::{AuditCategory, AuditEntry, AuditLogger};
use crate::utils::error::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub sessions_deleted: u64,
    pub audit_logs_deleted: u64,
    pub ran_at: DateTime<Utc>,
}

/// Deletes expired sessions and audit rows past the retention window.
pub struct CleanupService {
    sessions: Arc<dyn SessionRepository>,
    audit_rows: Arc<dyn AuditRepository>,
    audit: AuditLogger,
    retention: Duration,
}

impl CleanupService {
    pub fn new(stores: &Stores, audit_retention_days: i64) -> Self {
        Self {
            sessions: stores.sessions.clone(),
            audit_rows: stores.audit.clone(),
            audit: AuditLogger::new(stores.audit.clone()),
            retention: Duration::days(audit_retention_days),
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<CleanupReport, ApiError> {
        let sessions_deleted = self.sessions.delete_expired(now).await?;
        let audit_logs_deleted = self.audit_rows.delete_older_than(now - self.retention).await?;

        info!(
            "Cleanup removed {} expired session(s) and {} audit row(s)",
            sessions_deleted, audit_logs_deleted
        );

        self.audit
            .record(
                AuditEntry::builder("cleanup", AuditCategory::System)
                    .detail("sessions_deleted", sessions_deleted)
                    .detail("audit_logs_deleted", audit_logs_deleted)
                    .build(),
            )
            .await;

        Ok(CleanupReport {
            sessions_deleted,
            audit_logs_deleted,
            ran_at: now,
        })
    }
}
