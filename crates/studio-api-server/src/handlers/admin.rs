use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AdminSession;
use crate::config::ConfigKey;
use crate::database::{AuditLogRecord, User};
use crate::extractors::ApiQuery;
use crate::security::require_secret;
use crate::services::StepsReport;
use crate::state::AppState;
use crate::utils::error::ApiError;

const DEFAULT_AUDIT_LIMIT: i64 = 50;
const MAX_AUDIT_LIMIT: i64 = 500;

/// POST /api/admin/bootstrap
///
/// 200 when every step succeeded, 500 otherwise. The body is the full report
/// either way.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<StepsReport>), ApiError> {
    require_secret(&headers, &state.env, ConfigKey::AdminSetupSecret)?;
    let stores = state.stores()?;

    info!("Running admin bootstrap");
    let report = state.bootstrap_service.bootstrap(stores).await;

    let status = if report.ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(report)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub ok: bool,
    pub user: User,
}

/// POST /api/admin/reset-password
///
/// The body is optional; omitted fields fall back to `ADMIN_EMAIL` / `ADMIN_PASSWORD`.
pub async fn reset_password_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    require_secret(&headers, &state.env, ConfigKey::AdminSetupSecret)?;

    let request: ResetPasswordRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ResetPasswordRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?
    };
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let email = match non_empty(request.email) {
        Some(email) => email,
        None => state.env.resolve(ConfigKey::AdminEmail)?,
    };
    let new_password = match non_empty(request.new_password) {
        Some(password) => password,
        None => state.env.resolve(ConfigKey::AdminPassword)?,
    };

    let user = state
        .auth_service()?
        .reset_password(&email, &new_password)
        .await?;

    Ok(Json(ResetPasswordResponse { ok: true, user }))
}

/// GET /api/admin/diagnostics
pub async fn diagnostics_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StepsReport>, ApiError> {
    require_secret(&headers, &state.env, ConfigKey::AdminSetupSecret)?;

    let report = state
        .bootstrap_service
        .diagnostics(state.stores.as_ref())
        .await;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub entries: Vec<AuditLogRecord>,
}

/// GET /api/admin/audit-logs
pub async fn audit_logs_handler(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiQuery(params): ApiQuery<AuditLogParams>,
) -> Result<Json<AuditLogResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_AUDIT_LIMIT)
        .clamp(1, MAX_AUDIT_LIMIT);

    let entries = state.stores()?.audit.recent(limit).await?;
    Ok(Json(AuditLogResponse { entries }))
}
