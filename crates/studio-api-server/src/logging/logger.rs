use std::sync::Arc;
use tracing::{debug, warn};

use super::types::AuditEntry;
use crate::database::AuditRepository;

/// Appends audit entries inline. A failed write is logged and swallowed so the
/// request that produced the entry still completes.
#[derive(Clone)]
pub struct AuditLogger {
    repo: Arc<dyn AuditRepository>,
}

impl AuditLogger {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    pub async fn record(&self, entry: AuditEntry) {
        match self.repo.append(&entry).await {
            Ok(()) => debug!(
                "Audit entry written: action={}, category={}, success={}",
                entry.action, entry.category, entry.success
            ),
            Err(e) => warn!(
                "Failed to write audit entry action={} category={}: {}",
                entry.action, entry.category, e
            ),
        }
    }
}
