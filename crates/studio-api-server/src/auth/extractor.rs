use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::security::bearer_token;
use crate::services::Authenticated;
use crate::state::AppState;
use crate::utils::error::ApiError;

/// Caller identified by a live session token.
pub struct CurrentSession(pub Authenticated);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?
            .to_string();

        let authenticated = state.auth_service()?.authenticate(&token).await?;
        Ok(CurrentSession(authenticated))
    }
}

/// Like [`CurrentSession`], restricted to admin accounts.
pub struct AdminSession(pub Authenticated);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentSession(authenticated) = CurrentSession::from_request_parts(parts, state).await?;

        if !authenticated.user.is_admin() {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminSession(authenticated))
    }
}
