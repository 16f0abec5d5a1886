//! Schema bootstrap, admin seeding and the diagnostics report.
//!
//! Every step runs regardless of earlier failures and reports its own
//! outcome, so an operator sees the full picture in one call.

use chrono::Utc;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::auth::password::PasswordHasher;
use crate::config::{AuthConfig, ConfigKey, EnvResolver};
use crate::database::schema::{REQUIRED_TABLES, SCHEMA_STEPS};
use crate::database::{normalize_email, NewUser, Role, Stores};
use crate::logging::{AuditCategory, AuditEntry, AuditLogger};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StepReport {
    pub step: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepsReport {
    pub ok: bool,
    pub steps: Vec<StepReport>,
}

impl StepsReport {
    fn new() -> Self {
        Self {
            ok: true,
            steps: Vec::new(),
        }
    }

    fn record(&mut self, step: &str, outcome: Result<String, String>) {
        let (ok, detail) = match outcome {
            Ok(detail) => (true, detail),
            Err(detail) => {
                warn!("Step {} failed: {}", step, detail);
                (false, detail)
            }
        };
        self.ok &= ok;
        self.steps.push(StepReport {
            step: step.to_string(),
            ok,
            detail,
        });
    }

    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == name)
    }
}

const DATABASE_NOT_CONFIGURED: &str = "Database is not configured";

pub struct BootstrapService {
    env: EnvResolver,
    hasher: PasswordHasher,
    min_password_length: usize,
}

impl BootstrapService {
    pub fn new(env: EnvResolver, auth: &AuthConfig) -> Self {
        Self {
            env,
            hasher: PasswordHasher::new(auth.bcrypt_cost),
            min_password_length: auth.min_password_length,
        }
    }

    pub async fn bootstrap(&self, stores: &Stores) -> StepsReport {
        let mut report = StepsReport::new();

        for step in SCHEMA_STEPS.iter() {
            let outcome = stores
                .schema
                .execute(step.sql)
                .await
                .map(|_| "applied".to_string())
                .map_err(|e| e.to_string());
            report.record(step.name, outcome);
        }

        let seeded = self.seed_admin(stores).await;
        report.record("seed_admin", seeded);

        info!("Bootstrap finished (ok={})", report.ok);

        let mut entry = AuditEntry::builder("bootstrap", AuditCategory::Admin)
            .detail("steps", report.steps.len());
        if !report.ok {
            let failed: Vec<&str> = report
                .steps
                .iter()
                .filter(|s| !s.ok)
                .map(|s| s.step.as_str())
                .collect();
            entry = entry.failed(format!("failed steps: {}", failed.join(", ")));
        }
        AuditLogger::new(stores.audit.clone()).record(entry.build()).await;

        report
    }

    async fn seed_admin(&self, stores: &Stores) -> Result<String, String> {
        let email = self
            .env
            .resolve(ConfigKey::AdminEmail)
            .map(|e| normalize_email(&e))
            .map_err(|e| e.to_string())?;
        let password = self
            .env
            .resolve(ConfigKey::AdminPassword)
            .map_err(|e| e.to_string())?;

        if !email.contains('@') {
            return Err(format!("ADMIN_EMAIL is not a valid e-mail address: {}", email));
        }
        if password.chars().count() < self.min_password_length {
            return Err(format!(
                "ADMIN_PASSWORD must be at least {} characters",
                self.min_password_length
            ));
        }

        let password_hash = self.hasher.hash(&password).await.map_err(|e| e.to_string())?;

        let (admin, created) = stores
            .users
            .upsert_admin(&NewUser {
                email: email.clone(),
                display_name: "Administrator".to_string(),
                password_hash,
                role: Role::Admin,
                first_login: true,
            })
            .await
            .map_err(|e| e.to_string())?;

        if created {
            info!("Admin account {} created", admin.email);
            Ok(format!("Created admin account {}", admin.email))
        } else {
            info!("Admin account {} already present, password refreshed", admin.email);
            Ok(format!(
                "Admin account {} already present; password refreshed",
                admin.email
            ))
        }
    }

    pub async fn diagnostics(&self, stores: Option<&Stores>) -> StepsReport {
        let mut report = StepsReport::new();

        report.record(
            "config_database_url",
            match self.env.resolve(ConfigKey::DatabaseUrl) {
                Ok(_) => Ok("Database URL is set".to_string()),
                Err(e) => Err(e.to_string()),
            },
        );

        let missing: Vec<&str> = [ConfigKey::AdminEmail, ConfigKey::AdminPassword]
            .into_iter()
            .filter(|k| !self.env.is_configured(*k))
            .map(|k| k.canonical())
            .collect();
        report.record(
            "config_admin_credentials",
            if missing.is_empty() {
                Ok("Admin e-mail and password are set".to_string())
            } else {
                Err(format!("Missing: {}", missing.join(", ")))
            },
        );

        match stores {
            Some(stores) => self.database_checks(stores, &mut report).await,
            None => {
                for step in ["database_ping", "schema_tables", "admin_account", "active_sessions"] {
                    report.record(step, Err(DATABASE_NOT_CONFIGURED.to_string()));
                }
            }
        }

        report.record("bcrypt_self_test", self.bcrypt_self_test().await);
        report
    }

    async fn database_checks(&self, stores: &Stores, report: &mut StepsReport) {
        report.record(
            "database_ping",
            stores
                .schema
                .ping()
                .await
                .map(|_| "Database answered".to_string())
                .map_err(|e| e.to_string()),
        );

        let tables = match stores.schema.existing_tables().await {
            Ok(tables) => {
                let missing: Vec<&str> = REQUIRED_TABLES
                    .iter()
                    .copied()
                    .filter(|t| !tables.iter().any(|existing| existing.as_str() == *t))
                    .collect();
                if missing.is_empty() {
                    Ok(format!("Present: {}", REQUIRED_TABLES.join(", ")))
                } else {
                    Err(format!("Missing tables: {}", missing.join(", ")))
                }
            }
            Err(e) => Err(e.to_string()),
        };
        report.record("schema_tables", tables);

        report.record(
            "admin_account",
            match stores.users.count_by_role(Role::Admin.as_str()).await {
                Ok(0) => Err("No admin account exists".to_string()),
                Ok(n) => Ok(format!("{} admin account(s)", n)),
                Err(e) => Err(e.to_string()),
            },
        );

        report.record(
            "active_sessions",
            stores
                .sessions
                .count_active(Utc::now())
                .await
                .map(|n| format!("{} active session(s)", n))
                .map_err(|e| e.to_string()),
        );
    }

    async fn bcrypt_self_test(&self) -> Result<String, String> {
        let started = Instant::now();
        let sample = "diagnostics-self-test";

        let hash = self.hasher.hash(sample).await.map_err(|e| e.to_string())?;
        let valid = self
            .hasher
            .verify(sample, &hash)
            .await
            .map_err(|e| e.to_string())?;

        if valid {
            Ok(format!("Hash and verify took {} ms", started.elapsed().as_millis()))
        } else {
            Err("bcrypt verify rejected its own hash".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::database::memory::MemoryStore;

    fn admin_env() -> EnvResolver {
        EnvResolver::from_pairs(&[
            ("DATABASE_URL", "postgres://localhost/studio"),
            ("ADMIN_EMAIL", "Admin@Studio.dev"),
            ("ADMIN_PASSWORD", "change-me-now"),
        ])
    }

    fn service(env: EnvResolver) -> BootstrapService {
        BootstrapService::new(env, &Settings::for_tests().auth)
    }

    #[tokio::test]
    async fn test_bootstrap_twice_leaves_one_admin() {
        let store = MemoryStore::empty();
        let stores = store.stores();
        let bootstrap = service(admin_env());

        let first = bootstrap.bootstrap(&stores).await;
        assert!(first.ok, "{:?}", first.steps);
        assert_eq!(first.steps.len(), 6);
        assert!(first.step("seed_admin").unwrap().detail.starts_with("Created"));

        let second = bootstrap.bootstrap(&stores).await;
        assert!(second.ok);
        assert!(second
            .step("seed_admin")
            .unwrap()
            .detail
            .contains("already present"));

        let admins: Vec<_> = store.users().into_iter().filter(|u| u.is_admin()).collect();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].email, "admin@studio.dev");
    }

    #[tokio::test]
    async fn test_failed_step_does_not_stop_later_steps() {
        let store = MemoryStore::empty();
        store.fail_statements_containing("idx_sessions_expires_at");
        let report = service(admin_env()).bootstrap(&store.stores()).await;

        assert!(!report.ok);
        assert!(!report.step("create_sessions_expiry_index").unwrap().ok);
        assert!(report.step("create_audit_logs_table").unwrap().ok);
        assert!(report.step("seed_admin").unwrap().ok);
    }

    #[tokio::test]
    async fn test_missing_admin_credentials_fail_seed_step() {
        let store = MemoryStore::empty();
        let env = EnvResolver::from_pairs(&[("DATABASE_URL", "postgres://localhost/studio")]);
        let report = service(env).bootstrap(&store.stores()).await;

        let seed = report.step("seed_admin").unwrap();
        assert!(!seed.ok);
        assert!(seed.detail.contains("ADMIN_EMAIL"));
        assert!(store.users().is_empty());
    }

    #[tokio::test]
    async fn test_diagnostics_after_bootstrap_are_green() {
        let store = MemoryStore::empty();
        let stores = store.stores();
        let bootstrap = service(admin_env());
        bootstrap.bootstrap(&stores).await;

        let report = bootstrap.diagnostics(Some(&stores)).await;
        assert!(report.ok, "{:?}", report.steps);
        assert_eq!(report.steps.len(), 7);
    }

    #[tokio::test]
    async fn test_diagnostics_without_database() {
        let report = service(EnvResolver::from_pairs(&[])).diagnostics(None).await;

        assert!(!report.ok);
        assert!(!report.step("config_database_url").unwrap().ok);
        assert_eq!(report.step("database_ping").unwrap().detail, DATABASE_NOT_CONFIGURED);
        assert!(report.step("bcrypt_self_test").unwrap().ok);
    }

    #[tokio::test]
    async fn test_diagnostics_report_missing_tables() {
        let store = MemoryStore::empty();
        let report = service(admin_env()).diagnostics(Some(&store.stores())).await;

        let tables = report.step("schema_tables").unwrap();
        assert!(!tables.ok);
        assert!(tables.detail.contains("users"));
    }
}
