use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::{ConfigKey, ModelsConfig, ProvidersConfig};
use crate::models::chat::ChatMessage;
use crate::services::upstream;
use crate::utils::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LlmProvider {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic", alias = "claude")]
    Anthropic,
    #[serde(rename = "gemini", alias = "google")]
    Gemini,
}

impl LlmProvider {
    pub fn config_key(self) -> ConfigKey {
        match self {
            LlmProvider::OpenAi => ConfigKey::OpenAiApiKey,
            LlmProvider::Anthropic => ConfigKey::AnthropicApiKey,
            LlmProvider::Gemini => ConfigKey::GeminiApiKey,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OpenAI",
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::Gemini => "Gemini",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn prompt(system: Option<String>, prompt: impl Into<String>) -> Self {
        Self {
            system,
            messages: vec![ChatMessage::user(prompt)],
            ..Default::default()
        }
    }

    /// Request-level system text plus any system-role messages, in order.
    fn system_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .system
            .iter()
            .map(String::as_str)
            .chain(self.messages.iter().filter(|m| m.is_system()).map(|m| m.content.as_str()))
            .filter(|s| !s.trim().is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    fn conversation(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| !m.is_system())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub provider: LlmProvider,
    pub model: String,
    pub content: String,
}

// OpenAI chat completions
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: Option<String>,
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

// Anthropic messages
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: Option<String>,
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

// Gemini generateContent
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Clone)]
pub struct LlmService {
    client: Client,
    providers: ProvidersConfig,
    models: ModelsConfig,
}

impl LlmService {
    pub fn new(client: Client, providers: ProvidersConfig, models: ModelsConfig) -> Self {
        Self {
            client,
            providers,
            models,
        }
    }

    pub fn default_model(&self, provider: LlmProvider) -> &str {
        match provider {
            LlmProvider::OpenAi => &self.models.openai_chat,
            LlmProvider::Anthropic => &self.models.anthropic_chat,
            LlmProvider::Gemini => &self.models.gemini_chat,
        }
    }

    /// One non-streaming completion against the chosen provider.
    pub async fn complete(
        &self,
        provider: LlmProvider,
        api_key: &str,
        request: CompletionRequest,
    ) -> Result<Completion, ApiError> {
        let model = request
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_model(provider).to_string());

        debug!(
            "{} completion with model {} ({} messages)",
            provider.label(),
            model,
            request.messages.len()
        );

        let (served_model, content) = match provider {
            LlmProvider::OpenAi => self.openai(api_key, &model, &request).await?,
            LlmProvider::Anthropic => self.anthropic(api_key, &model, &request).await?,
            LlmProvider::Gemini => self.gemini(api_key, &model, &request).await?,
        };

        if content.trim().is_empty() {
            return Err(ApiError::Upstream {
                provider: provider.label(),
                status: 502,
                message: format!("{} returned an empty completion", provider.label()),
            });
        }

        Ok(Completion {
            provider,
            model: served_model.unwrap_or(model),
            content,
        })
    }

    async fn openai(
        &self,
        api_key: &str,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<(Option<String>, String), ApiError> {
        let mut messages = Vec::new();
        if let Some(system) = request.system_text() {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.extend(
            request
                .conversation()
                .map(|m| json!({ "role": m.role, "content": m.content })),
        );

        let body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(self.models.max_tokens),
            "temperature": request.temperature.unwrap_or(self.models.temperature),
        });

        let response: OpenAiResponse = upstream::send_json(
            LlmProvider::OpenAi.label(),
            self.client
                .post(format!("{}/v1/chat/completions", self.providers.openai_base_url))
                .bearer_auth(api_key)
                .json(&body),
        )
        .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok((response.model, content))
    }

    async fn anthropic(
        &self,
        api_key: &str,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<(Option<String>, String), ApiError> {
        let messages: Vec<_> = request
            .conversation()
            .map(|m| json!({ "role": m.role, "content": m.content }))
            .collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(self.models.max_tokens),
            "temperature": request.temperature.unwrap_or(self.models.temperature),
        });
        if let Some(system) = request.system_text() {
            body["system"] = json!(system);
        }

        let response: AnthropicResponse = upstream::send_json(
            LlmProvider::Anthropic.label(),
            self.client
                .post(format!("{}/v1/messages", self.providers.anthropic_base_url))
                .header("x-api-key", api_key)
                .header("anthropic-version", &self.providers.anthropic_version)
                .json(&body),
        )
        .await?;

        let content = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok((response.model, content))
    }

    async fn gemini(
        &self,
        api_key: &str,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<(Option<String>, String), ApiError> {
        // Gemini names the assistant role "model"
        let contents: Vec<_> = request
            .conversation()
            .map(|m| {
                let role = if m.role.eq_ignore_ascii_case("assistant") {
                    "model"
                } else {
                    "user"
                };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": request.max_tokens.unwrap_or(self.models.max_tokens),
                "temperature": request.temperature.unwrap_or(self.models.temperature),
            },
        });
        if let Some(system) = request.system_text() {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        let response: GeminiResponse = upstream::send_json(
            LlmProvider::Gemini.label(),
            self.client
                .post(format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.providers.gemini_base_url, model
                ))
                .header("x-goog-api-key", api_key)
                .json(&body),
        )
        .await?;

        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok((response.model_version, content))
    }
}
