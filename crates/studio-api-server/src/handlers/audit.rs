use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::CurrentSession;
use crate::extractors::ApiJson;
use crate::handlers::auth::OkResponse;
use crate::logging::AuditEntry;
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ClientAuditRequest {
    pub action: String,
    pub category: Option<String>,
    #[serde(default)]
    pub details: Value,
}

/// POST /api/audit
pub async fn client_audit_handler(
    State(state): State<AppState>,
    CurrentSession(auth): CurrentSession,
    ApiJson(request): ApiJson<ClientAuditRequest>,
) -> Result<(StatusCode, Json<OkResponse>), ApiError> {
    let action = request.action.trim();
    if action.is_empty() {
        return Err(ApiError::BadRequest("action is required".to_string()));
    }

    let entry = AuditEntry::client(action, request.category)
        .user(auth.user.id)
        .details(request.details)
        .build();
    state.audit_logger()?.record(entry).await;

    Ok((StatusCode::CREATED, OkResponse::ok()))
}
