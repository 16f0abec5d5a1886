use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::config::ConfigKey;
use crate::extractors::ValidatedJson;
use crate::services::image_service::{GeneratedImage, ImageRequest, DEFAULT_SIZE, SUPPORTED_SIZES};
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct ImageGenerateRequest {
    #[validate(length(min = 1, max = 4000, message = "prompt must be 1-4000 characters"))]
    pub prompt: String,
    pub size: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 1, max = 4, message = "n must be between 1 and 4"))]
    pub n: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct ImageGenerateResponse {
    pub images: Vec<GeneratedImage>,
}

/// POST /api/images/generate
pub async fn generate_image_handler(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ImageGenerateRequest>,
) -> Result<Json<ImageGenerateResponse>, ApiError> {
    let api_key = state.env.resolve(ConfigKey::OpenAiApiKey)?;

    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt is required".to_string()));
    }

    let size = request.size.unwrap_or_else(|| DEFAULT_SIZE.to_string());
    if !SUPPORTED_SIZES.contains(&size.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unsupported size {}; expected one of {}",
            size,
            SUPPORTED_SIZES.join(", ")
        )));
    }

    let n = request.n.unwrap_or(1);
    info!("Image generation request: {} x {}", n, size);

    let images = state
        .image_service
        .generate(
            &api_key,
            ImageRequest {
                prompt: request.prompt,
                size,
                model: request.model,
                n,
            },
        )
        .await?;

    Ok(Json(ImageGenerateResponse { images }))
}
