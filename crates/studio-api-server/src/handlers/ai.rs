use axum::{extract::State, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::extractors::ApiJson;
use crate::models::chat::ChatMessage;
use crate::services::prompts::{
    ideas_prompt, script_prompt, IDEAS_SYSTEM_PROMPT, SCRIPT_SYSTEM_PROMPT,
};
use crate::services::{CompletionRequest, LlmProvider};
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiAction {
    Chat,
    Generate,
    Script,
    Ideas,
}

impl AiAction {
    fn as_str(self) -> &'static str {
        match self {
            AiAction::Chat => "chat",
            AiAction::Generate => "generate",
            AiAction::Script => "script",
            AiAction::Ideas => "ideas",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AiRequest {
    #[serde(default)]
    pub provider: LlmProvider,
    pub action: AiAction,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Action-specific fields.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct AiResponse {
    pub provider: LlmProvider,
    pub action: AiAction,
    pub model: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ChatData {
    messages: Vec<ChatMessage>,
    system: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateData {
    prompt: String,
    system: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScriptData {
    topic: String,
    #[serde(default = "default_duration")]
    duration_seconds: u32,
    tone: Option<String>,
    platform: Option<String>,
}

fn default_duration() -> u32 {
    60
}

#[derive(Debug, Deserialize)]
struct IdeasData {
    niche: String,
    #[serde(default = "default_idea_count")]
    count: u32,
}

pub(crate) fn default_idea_count() -> u32 {
    5
}

fn action_data<T: DeserializeOwned>(action: AiAction, data: Map<String, Value>) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(data))
        .map_err(|e| ApiError::BadRequest(format!("Invalid {} payload: {}", action.as_str(), e)))
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

impl AiRequest {
    fn into_completion(self) -> Result<CompletionRequest, ApiError> {
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ApiError::BadRequest(
                    "temperature must be between 0 and 2".to_string(),
                ));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(ApiError::BadRequest("max_tokens must be positive".to_string()));
        }

        let mut request = match self.action {
            AiAction::Chat => {
                let data: ChatData = action_data(self.action, self.data)?;
                if data.messages.iter().all(|m| m.is_system()) {
                    return Err(ApiError::BadRequest(
                        "messages must include at least one user message".to_string(),
                    ));
                }
                CompletionRequest {
                    system: data.system,
                    messages: data.messages,
                    ..Default::default()
                }
            }
            AiAction::Generate => {
                let data: GenerateData = action_data(self.action, self.data)?;
                require_text("prompt", &data.prompt)?;
                CompletionRequest::prompt(data.system, data.prompt)
            }
            AiAction::Script => {
                let data: ScriptData = action_data(self.action, self.data)?;
                require_text("topic", &data.topic)?;
                CompletionRequest::prompt(
                    Some(SCRIPT_SYSTEM_PROMPT.to_string()),
                    script_prompt(
                        data.topic.trim(),
                        data.duration_seconds.clamp(5, 600),
                        data.tone.as_deref(),
                        data.platform.as_deref(),
                    ),
                )
            }
            AiAction::Ideas => {
                let data: IdeasData = action_data(self.action, self.data)?;
                require_text("niche", &data.niche)?;
                CompletionRequest::prompt(
                    Some(IDEAS_SYSTEM_PROMPT.to_string()),
                    ideas_prompt(data.niche.trim(), data.count),
                )
            }
        };

        request.model = self.model;
        request.max_tokens = self.max_tokens;
        request.temperature = self.temperature;
        Ok(request)
    }
}

/// POST /api/ai
pub async fn ai_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AiRequest>,
) -> Result<Json<AiResponse>, ApiError> {
    let provider = request.provider;
    let action = request.action;
    let api_key = state.env.resolve(provider.config_key())?;

    let completion_request = request.into_completion()?;
    info!("AI {} request via {}", action.as_str(), provider.label());

    let completion = state
        .llm_service
        .complete(provider, &api_key, completion_request)
        .await?;

    Ok(Json(AiResponse {
        provider: completion.provider,
        action,
        model: completion.model,
        content: completion.content,
    }))
}
