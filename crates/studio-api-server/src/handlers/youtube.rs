use axum::{extract::State, http::HeaderMap, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::token::generate_oauth_state;
use crate::config::ConfigKey;
use crate::extractors::{ApiJson, ApiQuery, ValidatedJson};
use crate::handlers::ai::default_idea_count;
use crate::security::bearer_token;
use crate::services::prompts::{channel_ideas_prompt, IDEAS_SYSTEM_PROMPT};
use crate::services::youtube_service::{
    fallback_trending, ChannelRef, ChannelSummary, OAuthClient, OAuthTokens, TokenGrant,
    UploadMetadata, UploadedVideo, VideoSummary, DEFAULT_TRENDING_RESULTS, MAX_RESULTS,
};
use crate::services::{CompletionRequest, LlmProvider};
use crate::state::AppState;
use crate::utils::error::ApiError;

fn channel_ref(handle: Option<String>, id: Option<String>) -> Result<ChannelRef, ApiError> {
    let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    match (clean(handle), clean(id)) {
        (_, Some(id)) => Ok(ChannelRef::Id(id)),
        (Some(handle), None) => {
            let handle = if handle.starts_with('@') {
                handle
            } else {
                format!("@{}", handle)
            };
            Ok(ChannelRef::Handle(handle))
        }
        (None, None) => Err(ApiError::BadRequest(
            "Either handle or id is required".to_string(),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelParams {
    pub handle: Option<String>,
    #[serde(alias = "channel_id")]
    pub id: Option<String>,
}

/// GET /api/youtube/channel
pub async fn channel_handler(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ChannelParams>,
) -> Result<Json<ChannelSummary>, ApiError> {
    let api_key = state.env.resolve(ConfigKey::YoutubeApiKey)?;
    let channel = channel_ref(params.handle, params.id)?;

    let summary = state.youtube_service.channel(&api_key, &channel).await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    pub region: Option<String>,
    pub category: Option<String>,
    pub max_results: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct VideosResponse {
    pub videos: Vec<VideoSummary>,
    pub fallback: bool,
}

/// GET /api/youtube/trending
///
/// Serves a sample list when no API key is configured.
pub async fn trending_handler(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TrendingParams>,
) -> Result<Json<VideosResponse>, ApiError> {
    let max_results = params
        .max_results
        .unwrap_or(DEFAULT_TRENDING_RESULTS)
        .clamp(1, MAX_RESULTS);

    let Some(api_key) = state.env.lookup(ConfigKey::YoutubeApiKey) else {
        warn!("YouTube key not configured, serving fallback trending list");
        let mut videos = fallback_trending();
        videos.truncate(max_results as usize);
        return Ok(Json(VideosResponse {
            videos,
            fallback: true,
        }));
    };

    let region = params
        .region
        .map(|r| r.trim().to_uppercase())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "US".to_string());
    if region.len() != 2 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::BadRequest(format!(
            "region must be a two-letter country code, got {}",
            region
        )));
    }
    let category = params.category.filter(|c| !c.trim().is_empty());

    let videos = state
        .youtube_service
        .trending(&api_key, &region, category.as_deref(), max_results)
        .await?;

    Ok(Json(VideosResponse {
        videos,
        fallback: false,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(alias = "query")]
    pub q: Option<String>,
    pub max_results: Option<u32>,
    pub short_only: Option<bool>,
}

/// GET /api/youtube/search
pub async fn search_handler(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<VideosResponse>, ApiError> {
    let api_key = state.env.resolve(ConfigKey::YoutubeApiKey)?;

    let q = params
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("q is required".to_string()))?;
    let max_results = params.max_results.unwrap_or(DEFAULT_TRENDING_RESULTS).clamp(1, MAX_RESULTS);

    let videos = state
        .youtube_service
        .search(&api_key, &q, max_results, params.short_only.unwrap_or(true))
        .await?;

    Ok(Json(VideosResponse {
        videos,
        fallback: false,
    }))
}

#[derive(Debug, Deserialize)]
pub struct IdeasRequest {
    pub handle: Option<String>,
    pub channel_id: Option<String>,
    #[serde(default)]
    pub provider: LlmProvider,
    pub model: Option<String>,
    #[serde(default = "default_idea_count")]
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct IdeasResponse {
    pub channel: ChannelSummary,
    pub provider: LlmProvider,
    pub model: String,
    pub ideas: String,
}

/// POST /api/youtube/ideas
///
/// Channel lookup followed by one completion; either failure fails the request.
pub async fn ideas_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IdeasRequest>,
) -> Result<Json<IdeasResponse>, ApiError> {
    let youtube_key = state.env.resolve(ConfigKey::YoutubeApiKey)?;
    let llm_key = state.env.resolve(request.provider.config_key())?;
    let channel = channel_ref(request.handle, request.channel_id)?;

    let summary = state.youtube_service.channel(&youtube_key, &channel).await?;
    info!("Generating ideas for channel {} via {}", summary.id, request.provider.label());

    let mut completion_request = CompletionRequest::prompt(
        Some(IDEAS_SYSTEM_PROMPT.to_string()),
        channel_ideas_prompt(&summary, request.count),
    );
    completion_request.model = request.model;

    let completion = state
        .llm_service
        .complete(request.provider, &llm_key, completion_request)
        .await?;

    Ok(Json(IdeasResponse {
        channel: summary,
        provider: completion.provider,
        model: completion.model,
        ideas: completion.content,
    }))
}

#[derive(Debug, Serialize)]
pub struct OAuthUrlResponse {
    pub url: String,
    pub state: String,
}

/// GET /api/youtube/oauth/url
pub async fn oauth_url_handler(State(state): State<AppState>) -> Result<Json<OAuthUrlResponse>, ApiError> {
    let client_id = state.env.resolve(ConfigKey::YoutubeClientId)?;
    let redirect_uri = state.env.resolve(ConfigKey::YoutubeRedirectUri)?;

    let oauth_state = generate_oauth_state();
    let url = state
        .youtube_service
        .authorization_url(&client_id, &redirect_uri, &oauth_state)?;

    Ok(Json(OAuthUrlResponse {
        url,
        state: oauth_state,
    }))
}

#[derive(Debug, Deserialize)]
pub struct OAuthTokenRequest {
    pub code: Option<String>,
    pub refresh_token: Option<String>,
}

/// POST /api/youtube/oauth/token
pub async fn oauth_token_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<OAuthTokenRequest>,
) -> Result<Json<OAuthTokens>, ApiError> {
    let oauth = OAuthClient {
        client_id: state.env.resolve(ConfigKey::YoutubeClientId)?,
        client_secret: state.env.resolve(ConfigKey::YoutubeClientSecret)?,
        redirect_uri: state.env.resolve(ConfigKey::YoutubeRedirectUri)?,
    };

    let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let grant = match (non_empty(request.code), non_empty(request.refresh_token)) {
        (Some(code), _) => TokenGrant::AuthorizationCode(code),
        (None, Some(refresh)) => TokenGrant::RefreshToken(refresh),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Either code or refresh_token is required".to_string(),
            ))
        }
    };

    let tokens = state.youtube_service.exchange_token(&oauth, grant).await?;
    Ok(Json(tokens))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub privacy_status: Option<String>,
    pub category_id: Option<String>,
    pub video_base64: String,
    pub content_type: Option<String>,
}

/// POST /api/youtube/upload
///
/// The caller's OAuth access token travels in `Authorization: Bearer`.
pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<UploadRequest>,
) -> Result<Json<UploadedVideo>, ApiError> {
    let access_token = bearer_token(&headers)
        .ok_or_else(|| {
            ApiError::BadRequest("A YouTube access token is required (Authorization: Bearer)".to_string())
        })?
        .to_string();

    let privacy_status = request
        .privacy_status
        .map(|p| p.trim().to_lowercase())
        .unwrap_or_else(|| "private".to_string());
    if !matches!(privacy_status.as_str(), "private" | "unlisted" | "public") {
        return Err(ApiError::BadRequest(format!(
            "privacy_status must be private, unlisted or public, got {}",
            privacy_status
        )));
    }

    // tolerate data URLs from the browser
    let encoded = request
        .video_base64
        .split_once("base64,")
        .map(|(_, data)| data)
        .unwrap_or(&request.video_base64)
        .trim();
    let video = STANDARD
        .decode(encoded)
        .map_err(|e| ApiError::BadRequest(format!("video_base64 is not valid base64: {}", e)))?;
    if video.is_empty() {
        return Err(ApiError::BadRequest("video_base64 is empty".to_string()));
    }

    let content_type = request
        .content_type
        .unwrap_or_else(|| "video/mp4".to_string());

    info!("Uploading {} byte video '{}'", video.len(), request.title);

    let uploaded = state
        .youtube_service
        .upload(
            &access_token,
            UploadMetadata {
                title: request.title,
                description: request.description,
                tags: request.tags,
                privacy_status,
                category_id: request.category_id.unwrap_or_else(|| "22".to_string()),
            },
            video,
            &content_type,
        )
        .await?;

    Ok(Json(uploaded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_ref_prefers_id_and_prefixes_handles() {
        assert!(matches!(
            channel_ref(Some("studio".into()), Some("UC1".into())),
            Ok(ChannelRef::Id(ref id)) if id == "UC1"
        ));
        assert!(matches!(
            channel_ref(Some("studio".into()), None),
            Ok(ChannelRef::Handle(ref h)) if h == "@studio"
        ));
        assert!(channel_ref(Some("  ".into()), None).is_err());
    }
}
