//! Idempotent schema statements, applied one at a time by the bootstrap routine.

pub struct SchemaStep {
    pub name: &'static str,
    pub sql: &'static str,
}

pub const REQUIRED_TABLES: [&str; 3] = ["users", "sessions", "audit_logs"];

pub const SCHEMA_STEPS: [SchemaStep; 5] = [
    SchemaStep {
        name: "create_users_table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                first_login BOOLEAN NOT NULL DEFAULT TRUE,
                last_login_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
    },
    SchemaStep {
        name: "create_sessions_table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token TEXT NOT NULL UNIQUE,
                expires_at TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
    },
    SchemaStep {
        name: "create_sessions_expiry_index",
        sql: "CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at)",
    },
    SchemaStep {
        name: "create_audit_logs_table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS audit_logs (
                id BIGSERIAL PRIMARY KEY,
                user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                action TEXT NOT NULL,
                category TEXT NOT NULL,
                details JSONB NOT NULL DEFAULT '{}'::jsonb,
                success BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
    },
    SchemaStep {
        name: "create_audit_logs_created_index",
        sql: "CREATE INDEX IF NOT EXISTS idx_audit_logs_created_at ON audit_logs(created_at)",
    },
];
