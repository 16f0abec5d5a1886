use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentSession;
use crate::database::User;
use crate::extractors::{ApiJson, ValidatedJson};
use crate::services::LoginResult;
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(length(max = 120, message = "display_name must be at most 120 characters"))]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

/// POST /api/auth/signup
pub async fn signup_handler(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<LoginResult>), ApiError> {
    let result = state
        .auth_service()?
        .signup(&request.email, &request.password, request.display_name.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /api/auth/login
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResult>, ApiError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let result = state
        .auth_service()?
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(result))
}

/// POST /api/auth/logout
pub async fn logout_handler(
    State(state): State<AppState>,
    CurrentSession(auth): CurrentSession,
) -> Result<Json<OkResponse>, ApiError> {
    state.auth_service()?.logout(&auth).await?;
    Ok(OkResponse::ok())
}

/// GET /api/auth/session
pub async fn session_handler(CurrentSession(auth): CurrentSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        expires_at: auth.session.expires_at,
        user: auth.user,
    })
}

/// POST /api/auth/change-password
pub async fn change_password_handler(
    State(state): State<AppState>,
    CurrentSession(auth): CurrentSession,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    state
        .auth_service()?
        .change_password(&auth.user, &request.current_password, &request.new_password)
        .await?;
    Ok(OkResponse::ok())
}
