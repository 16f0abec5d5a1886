//! Audit logging into the `audit_logs` table

mod logger;
pub mod types;

pub use logger::AuditLogger;
pub use types::{AuditCategory, AuditEntry, AuditEntryBuilder};
