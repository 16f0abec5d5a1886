use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::{ConfigKey, ModelsConfig, ProvidersConfig};
use crate::services::upstream;
use crate::utils::error::ApiError;

/// ElevenLabs caps a single request at 5000 characters.
pub const MAX_TEXT_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TtsProvider {
    #[default]
    #[serde(rename = "elevenlabs", alias = "eleven_labs")]
    ElevenLabs,
    #[serde(rename = "openai")]
    OpenAi,
}

impl TtsProvider {
    pub fn config_key(self) -> ConfigKey {
        match self {
            TtsProvider::ElevenLabs => ConfigKey::ElevenLabsApiKey,
            TtsProvider::OpenAi => ConfigKey::OpenAiApiKey,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TtsProvider::ElevenLabs => "ElevenLabs",
            TtsProvider::OpenAi => "OpenAI",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Speech {
    pub provider: TtsProvider,
    pub voice_id: String,
    pub content_type: String,
    pub audio: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<Voice>,
}

/// ElevenLabs premade voices, served when no key is configured.
pub fn fallback_voices() -> Vec<Voice> {
    [
        ("21m00Tcm4TlvDq8ikWAM", "Rachel"),
        ("AZnzlk1XvdvUeBnXmlld", "Domi"),
        ("EXAVITQu4vr4xnSDxMaL", "Bella"),
        ("ErXwobaYiN019PkySvjV", "Antoni"),
        ("MF3mGyEYCl7XYWbV9V6O", "Elli"),
        ("TxGEqnHWrfWFTfGW9XjX", "Josh"),
        ("VR6AewLTigWG4xSOukaG", "Arnold"),
        ("pNInz6obpgDQGcFmaJgB", "Adam"),
        ("yoZ06aMxZJJ28mfd3POQ", "Sam"),
    ]
    .into_iter()
    .map(|(voice_id, name)| Voice {
        voice_id: voice_id.to_string(),
        name: name.to_string(),
        category: Some("premade".to_string()),
        preview_url: None,
    })
    .collect()
}

#[derive(Clone)]
pub struct TtsService {
    client: Client,
    providers: ProvidersConfig,
    models: ModelsConfig,
}

impl TtsService {
    pub fn new(client: Client, providers: ProvidersConfig, models: ModelsConfig) -> Self {
        Self {
            client,
            providers,
            models,
        }
    }

    pub async fn synthesize(
        &self,
        provider: TtsProvider,
        api_key: &str,
        request: SpeechRequest,
    ) -> Result<Speech, ApiError> {
        match provider {
            TtsProvider::ElevenLabs => self.elevenlabs(api_key, request).await,
            TtsProvider::OpenAi => self.openai(api_key, request).await,
        }
    }

    async fn elevenlabs(&self, api_key: &str, request: SpeechRequest) -> Result<Speech, ApiError> {
        let voice_id = request
            .voice_id
            .unwrap_or_else(|| self.models.elevenlabs_voice_id.clone());
        // interpolated into the URL path
        if voice_id.is_empty() || !voice_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ApiError::BadRequest(
                "voice_id must be alphanumeric".to_string(),
            ));
        }
        let model = request
            .model
            .unwrap_or_else(|| self.models.elevenlabs_tts.clone());

        debug!("ElevenLabs TTS: voice {} model {} ({} chars)", voice_id, model, request.text.len());

        let body = json!({
            "text": request.text,
            "model_id": model,
            "voice_settings": { "stability": 0.5, "similarity_boost": 0.75 },
        });

        let response = upstream::send(
            TtsProvider::ElevenLabs.label(),
            self.client
                .post(format!(
                    "{}/v1/text-to-speech/{}",
                    self.providers.elevenlabs_base_url, voice_id
                ))
                .header("xi-api-key", api_key)
                .header(ACCEPT, "audio/mpeg")
                .json(&body),
        )
        .await?;

        let content_type = content_type_of(&response);
        let audio = read_audio(TtsProvider::ElevenLabs, response).await?;

        Ok(Speech {
            provider: TtsProvider::ElevenLabs,
            voice_id,
            content_type,
            audio,
        })
    }

    async fn openai(&self, api_key: &str, request: SpeechRequest) -> Result<Speech, ApiError> {
        let voice_id = request
            .voice_id
            .unwrap_or_else(|| self.models.openai_tts_voice.clone());
        let model = request.model.unwrap_or_else(|| self.models.openai_tts.clone());

        debug!("OpenAI TTS: voice {} model {}", voice_id, model);

        let body = json!({
            "model": model,
            "input": request.text,
            "voice": voice_id,
            "response_format": "mp3",
        });

        let response = upstream::send(
            TtsProvider::OpenAi.label(),
            self.client
                .post(format!("{}/v1/audio/speech", self.providers.openai_base_url))
                .bearer_auth(api_key)
                .json(&body),
        )
        .await?;

        let content_type = content_type_of(&response);
        let audio = read_audio(TtsProvider::OpenAi, response).await?;

        Ok(Speech {
            provider: TtsProvider::OpenAi,
            voice_id,
            content_type,
            audio,
        })
    }

    pub async fn voices(&self, api_key: &str) -> Result<Vec<Voice>, ApiError> {
        let response: VoicesResponse = upstream::send_json(
            TtsProvider::ElevenLabs.label(),
            self.client
                .get(format!("{}/v1/voices", self.providers.elevenlabs_base_url))
                .header("xi-api-key", api_key),
        )
        .await?;

        Ok(response.voices)
    }
}

fn content_type_of(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("audio/"))
        .unwrap_or("audio/mpeg")
        .to_string()
}

async fn read_audio(provider: TtsProvider, response: reqwest::Response) -> Result<Vec<u8>, ApiError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::UpstreamUnavailable {
            provider: provider.label(),
            message: format!("Failed to read audio: {}", e),
        })?;

    if bytes.is_empty() {
        return Err(ApiError::Upstream {
            provider: provider.label(),
            status: 502,
            message: format!("{} returned empty audio", provider.label()),
        });
    }

    Ok(bytes.to_vec())
}
