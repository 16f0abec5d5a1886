use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::ConfigKey;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub openai: bool,
    pub anthropic: bool,
    pub gemini: bool,
    pub elevenlabs: bool,
    pub pexels: bool,
    pub pixabay: bool,
    pub youtube: bool,
    pub youtube_oauth: bool,
}

#[derive(Debug, Serialize)]
pub struct ConfigStatusResponse {
    pub providers: ProviderStatus,
    pub database: bool,
}

/// Which integrations are usable, so the frontend can pick live or demo mode.
pub async fn config_status_handler(State(state): State<AppState>) -> Json<ConfigStatusResponse> {
    let env = &state.env;
    let configured = |key: ConfigKey| env.is_configured(key);

    Json(ConfigStatusResponse {
        providers: ProviderStatus {
            openai: configured(ConfigKey::OpenAiApiKey),
            anthropic: configured(ConfigKey::AnthropicApiKey),
            gemini: configured(ConfigKey::GeminiApiKey),
            elevenlabs: configured(ConfigKey::ElevenLabsApiKey),
            pexels: configured(ConfigKey::PexelsApiKey),
            pixabay: configured(ConfigKey::PixabayApiKey),
            youtube: configured(ConfigKey::YoutubeApiKey),
            youtube_oauth: configured(ConfigKey::YoutubeClientId)
                && configured(ConfigKey::YoutubeClientSecret)
                && configured(ConfigKey::YoutubeRedirectUri),
        },
        database: configured(ConfigKey::DatabaseUrl),
    })
}
