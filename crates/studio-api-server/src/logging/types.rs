use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Audit entry categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditCategory {
    Auth,
    Admin,
    System,
    Client,
}

impl AuditCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Admin => "admin",
            Self::System => "system",
            Self::Client => "client",
        }
    }
}

/// Row to append to `audit_logs`
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub user_id: Option<i32>,
    pub action: String,
    pub category: String,
    pub details: Value,
    pub success: bool,
}

impl AuditEntry {
    pub fn builder(action: impl Into<String>, category: AuditCategory) -> AuditEntryBuilder {
        AuditEntryBuilder::new(action, category.as_str())
    }

    /// Frontend entries are always filed under `client`. A caller-supplied
    /// category is kept in details as `client_category`.
    pub fn client(action: impl Into<String>, category: Option<String>) -> AuditEntryBuilder {
        let builder = AuditEntryBuilder::new(action, AuditCategory::Client.as_str());
        match category.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty()) {
            Some(category) => builder.detail("client_category", category),
            None => builder,
        }
    }
}

pub struct AuditEntryBuilder {
    entry: AuditEntry,
    details: Map<String, Value>,
}

impl AuditEntryBuilder {
    fn new(action: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            entry: AuditEntry {
                user_id: None,
                action: action.into(),
                category: category.into(),
                details: Value::Null,
                success: true,
            },
            details: Map::new(),
        }
    }

    pub fn user(mut self, user_id: i32) -> Self {
        self.entry.user_id = Some(user_id);
        self
    }

    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Merge an object of caller-supplied details. Non-object values land under `data`.
    pub fn details(mut self, value: Value) -> Self {
        match value {
            Value::Object(map) => self.details.extend(map),
            Value::Null => {}
            other => {
                self.details.insert("data".to_string(), other);
            }
        }
        self
    }

    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.entry.success = false;
        self.details.insert("reason".to_string(), Value::String(reason.into()));
        self
    }

    pub fn build(mut self) -> AuditEntry {
        self.entry.details = Value::Object(self.details);
        self.entry
    }
}
