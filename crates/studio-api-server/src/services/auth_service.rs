use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::password::PasswordHasher;
use crate::auth::token::generate_session_token;
use crate::config::AuthConfig;
use crate::database::{
    normalize_email, NewUser, Role, Session, SessionRepository, Stores, User, UserRepository,
};
use crate::logging::{AuditCategory, AuditEntry, AuditLogger};
use crate::utils::error::ApiError;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
    pub first_login: bool,
}

/// A resolved bearer session and its owner.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub session: Session,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    audit: AuditLogger,
    hasher: PasswordHasher,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(stores: &Stores, config: AuthConfig) -> Self {
        Self {
            users: stores.users.clone(),
            sessions: stores.sessions.clone(),
            audit: AuditLogger::new(stores.audit.clone()),
            hasher: PasswordHasher::new(config.bcrypt_cost),
            config,
        }
    }

    pub fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    pub fn validate_password(&self, password: &str) -> Result<(), ApiError> {
        if password.chars().count() < self.config.min_password_length {
            return Err(ApiError::BadRequest(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        Ok(())
    }

    async fn open_session(&self, user: User) -> Result<LoginResult, ApiError> {
        let token = generate_session_token();
        let expires_at = Utc::now() + Duration::hours(self.config.session_ttl_hours);
        let session = self.sessions.create(user.id, &token, expires_at).await?;

        Ok(LoginResult {
            token,
            expires_at: session.expires_at,
            first_login: user.first_login,
            user,
        })
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<LoginResult, ApiError> {
        let email = normalize_email(email);
        self.validate_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let display_name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let user = self
            .users
            .create(&NewUser {
                email: email.clone(),
                display_name,
                password_hash: self.hasher.hash(password).await?,
                role: Role::User,
                first_login: false,
            })
            .await?;

        info!("New account registered: {}", user.email);
        self.audit
            .record(
                AuditEntry::builder("signup", AuditCategory::Auth)
                    .user(user.id)
                    .detail("email", email)
                    .build(),
            )
            .await;

        self.open_session(user).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, ApiError> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.audit_failed_login(None, &email, "unknown email").await;
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            self.audit_failed_login(Some(user.id), &email, "invalid password").await;
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            self.audit_failed_login(Some(user.id), &email, "account disabled").await;
            return Err(ApiError::Forbidden("Account is disabled".to_string()));
        }

        self.users.record_login(user.id, Utc::now()).await?;

        let result = self.open_session(user).await?;
        info!("User {} logged in", result.user.email);
        self.audit
            .record(
                AuditEntry::builder("login", AuditCategory::Auth)
                    .user(result.user.id)
                    .detail("email", email)
                    .build(),
            )
            .await;

        Ok(result)
    }

    async fn audit_failed_login(&self, user_id: Option<i32>, email: &str, reason: &str) {
        warn!("Failed login for {}: {}", email, reason);

        let mut builder = AuditEntry::builder("login", AuditCategory::Auth).detail("email", email);
        if let Some(id) = user_id {
            builder = builder.user(id);
        }
        self.audit.record(builder.failed(reason).build()).await;
    }

    pub async fn authenticate(&self, token: &str) -> Result<Authenticated, ApiError> {
        let session = self
            .sessions
            .find_active(token, Utc::now())
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Session expired or invalid".to_string()))?;

        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| ApiError::Unauthorized("Session expired or invalid".to_string()))?;

        Ok(Authenticated { user, session })
    }

    pub async fn logout(&self, auth: &Authenticated) -> Result<(), ApiError> {
        self.sessions.delete(&auth.session.token).await?;

        self.audit
            .record(
                AuditEntry::builder("logout", AuditCategory::Auth)
                    .user(auth.user.id)
                    .build(),
            )
            .await;
        Ok(())
    }

    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        if !self.hasher.verify(current_password, &user.password_hash).await? {
            self.audit
                .record(
                    AuditEntry::builder("change_password", AuditCategory::Auth)
                        .user(user.id)
                        .failed("current password mismatch")
                        .build(),
                )
                .await;
            return Err(ApiError::Unauthorized("Current password is incorrect".to_string()));
        }
        self.validate_password(new_password)?;

        let hash = self.hasher.hash(new_password).await?;
        self.users.update_password(user.id, &hash, false).await?;

        self.audit
            .record(
                AuditEntry::builder("change_password", AuditCategory::Auth)
                    .user(user.id)
                    .build(),
            )
            .await;
        Ok(())
    }

    /// Set a new password, force a password change on next login and revoke
    /// every open session of the account.
    pub async fn reset_password(&self, email: &str, new_password: &str) -> Result<User, ApiError> {
        let email = normalize_email(email);
        self.validate_password(new_password)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No account for {}", email)))?;

        let hash = self.hasher.hash(new_password).await?;
        self.users.update_password(user.id, &hash, true).await?;
        let revoked = self.sessions.delete_for_user(user.id).await?;

        info!("Password reset for {} ({} sessions revoked)", email, revoked);
        self.audit
            .record(
                AuditEntry::builder("reset_password", AuditCategory::Admin)
                    .user(user.id)
                    .detail("email", email)
                    .detail("sessions_revoked", revoked)
                    .build(),
            )
            .await;

        Ok(User {
            password_hash: hash,
            first_login: true,
            ..user
        })
    }
}
