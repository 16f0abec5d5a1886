use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::{ModelsConfig, ProvidersConfig};
use crate::services::upstream;
use crate::utils::error::ApiError;

const PROVIDER: &str = "OpenAI";

pub const DEFAULT_SIZE: &str = "1024x1792";
pub const SUPPORTED_SIZES: [&str; 8] = [
    "256x256",
    "512x512",
    "1024x1024",
    "1024x1792",
    "1792x1024",
    "1024x1536",
    "1536x1024",
    "auto",
];

#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: String,
    pub model: Option<String>,
    pub n: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Clone)]
pub struct ImageService {
    client: Client,
    providers: ProvidersConfig,
    models: ModelsConfig,
}

impl ImageService {
    pub fn new(client: Client, providers: ProvidersConfig, models: ModelsConfig) -> Self {
        Self {
            client,
            providers,
            models,
        }
    }

    pub async fn generate(
        &self,
        api_key: &str,
        request: ImageRequest,
    ) -> Result<Vec<GeneratedImage>, ApiError> {
        let model = request
            .model
            .unwrap_or_else(|| self.models.openai_image.clone());

        debug!("Generating {} image(s) at {} with {}", request.n, request.size, model);

        let body = json!({
            "model": model,
            "prompt": request.prompt,
            "n": request.n,
            "size": request.size,
        });

        let response: ImagesResponse = upstream::send_json(
            PROVIDER,
            self.client
                .post(format!("{}/v1/images/generations", self.providers.openai_base_url))
                .bearer_auth(api_key)
                .json(&body),
        )
        .await?;

        if response.data.is_empty() {
            return Err(ApiError::Upstream {
                provider: PROVIDER,
                status: 502,
                message: "OpenAI returned no images".to_string(),
            });
        }

        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_passes_size_and_reshapes_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({ "model": "dall-e-3", "size": "1024x1792", "n": 1 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1700000000,
                "data": [{ "url": "https://img.example/1.png", "revised_prompt": "a neon city" }],
            })))
            .mount(&server)
            .await;

        let mut settings = Settings::for_tests();
        settings.providers.openai_base_url = server.uri();
        let service = ImageService::new(Client::new(), settings.providers, settings.models);

        let images = service
            .generate(
                "sk-test",
                ImageRequest {
                    prompt: "a city".to_string(),
                    size: DEFAULT_SIZE.to_string(),
                    model: None,
                    n: 1,
                },
            )
            .await
            .unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url.as_deref(), Some("https://img.example/1.png"));
        assert_eq!(images[0].revised_prompt.as_deref(), Some("a neon city"));
        assert!(images[0].b64_json.is_none());
    }
}
