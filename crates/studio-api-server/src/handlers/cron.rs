use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;

use crate::config::ConfigKey;
use crate::security::require_secret;
use crate::services::CleanupReport;
use crate::state::AppState;
use crate::utils::error::ApiError;

/// GET /api/cron/cleanup
pub async fn cleanup_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CleanupReport>, ApiError> {
    require_secret(&headers, &state.env, ConfigKey::CronSecret)?;

    let report = state.cleanup_service()?.run(Utc::now()).await?;
    Ok(Json(report))
}
