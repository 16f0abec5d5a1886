use axum::{extract::State, Json};
use serde::Deserialize;

use crate::extractors::ApiQuery;
use crate::services::media_service::{
    MediaKind, MediaProvider, MediaQuery, MediaResults, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct MediaSearchParams {
    #[serde(default)]
    pub provider: MediaProvider,
    #[serde(default)]
    pub kind: MediaKind,
    #[serde(alias = "q")]
    pub query: Option<String>,
    pub per_page: Option<u32>,
    pub orientation: Option<String>,
}

/// GET /api/media/search
pub async fn media_search_handler(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MediaSearchParams>,
) -> Result<Json<MediaResults>, ApiError> {
    let api_key = state.env.resolve(params.provider.config_key())?;

    let query = params
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("query is required".to_string()))?;

    let orientation = params
        .orientation
        .map(|o| o.trim().to_lowercase())
        .filter(|o| !o.is_empty())
        .unwrap_or_else(|| "portrait".to_string());
    if !matches!(orientation.as_str(), "portrait" | "landscape" | "square") {
        return Err(ApiError::BadRequest(format!(
            "Unsupported orientation {}; expected portrait, landscape or square",
            orientation
        )));
    }

    let results = state
        .media_service
        .search(
            params.provider,
            &api_key,
            MediaQuery {
                query,
                kind: params.kind,
                per_page: params.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
                orientation,
            },
        )
        .await?;

    Ok(Json(results))
}
