use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ConfigKey;
use crate::extractors::ApiJson;
use crate::services::tts_service::{fallback_voices, SpeechRequest, TtsProvider, Voice, MAX_TEXT_CHARS};
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(default)]
    pub provider: TtsProvider,
    pub voice_id: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TtsResponse {
    pub provider: TtsProvider,
    pub voice_id: String,
    pub content_type: String,
    pub audio_base64: String,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
    pub fallback: bool,
}

/// POST /api/tts
pub async fn tts_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TtsRequest>,
) -> Result<Json<TtsResponse>, ApiError> {
    let api_key = state.env.resolve(request.provider.config_key())?;

    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text is required".to_string()));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "text must be at most {} characters",
            MAX_TEXT_CHARS
        )));
    }

    info!("TTS request via {} ({} chars)", request.provider.label(), text.len());

    let speech = state
        .tts_service
        .synthesize(
            request.provider,
            &api_key,
            SpeechRequest {
                text: text.to_string(),
                voice_id: request.voice_id.filter(|v| !v.trim().is_empty()),
                model: request.model,
            },
        )
        .await?;

    Ok(Json(TtsResponse {
        provider: speech.provider,
        voice_id: speech.voice_id,
        content_type: speech.content_type,
        audio_base64: STANDARD.encode(&speech.audio),
    }))
}

/// GET /api/tts/voices
///
/// Without an ElevenLabs key the premade catalogue is returned instead of an error.
pub async fn voices_handler(State(state): State<AppState>) -> Result<Json<VoicesResponse>, ApiError> {
    let Some(api_key) = state.env.lookup(ConfigKey::ElevenLabsApiKey) else {
        warn!("ElevenLabs key not configured, serving fallback voices");
        return Ok(Json(VoicesResponse {
            voices: fallback_voices(),
            fallback: true,
        }));
    };

    let voices = state.tts_service.voices(&api_key).await?;
    Ok(Json(VoicesResponse {
        voices,
        fallback: false,
    }))
}
