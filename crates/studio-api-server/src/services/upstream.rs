//! One outbound call to a third-party API, with status and error-body mapping.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::utils::error::ApiError;

const MAX_RAW_ERROR_CHARS: usize = 300;

/// Send the request; non-2xx responses become `ApiError::Upstream` carrying the
/// provider's own error message when one can be found in the body.
pub async fn send(provider: &'static str, request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(|e| {
        // the URL carries query-string API keys
        let e = e.without_url();
        warn!("{} request failed: {}", provider, e);
        ApiError::UpstreamUnavailable {
            provider,
            message: e.to_string(),
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Upstream request failed")
                .to_string()
        });

        warn!("{} API error ({}): {}", provider, status, message);
        return Err(ApiError::Upstream {
            provider,
            status: status.as_u16(),
            message,
        });
    }

    debug!("{} responded {}", provider, status);
    Ok(response)
}

pub async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<T, ApiError> {
    let response = send(provider, request).await?;

    response.json::<T>().await.map_err(|e| ApiError::Upstream {
        provider,
        status: 502,
        message: format!("Unexpected {} response: {}", provider, e.without_url()),
    })
}

/// Best-effort extraction of a human-readable error from a provider body.
pub fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<Value>(trimmed) else {
        return Some(truncate(trimmed));
    };

    let text = |v: &Value| v.as_str().map(str::to_string).filter(|s| !s.is_empty());

    // OpenAI / Anthropic / Google APIs: { "error": { "message": ... } }
    if let Some(msg) = json.pointer("/error/message").and_then(text) {
        return Some(msg);
    }

    // OAuth endpoints: { "error": "invalid_grant", "error_description": ... }
    if let Some(code) = json.get("error").and_then(text) {
        return Some(match json.get("error_description").and_then(text) {
            Some(description) => format!("{}: {}", code, description),
            None => code,
        });
    }

    // ElevenLabs: { "detail": { "message": ... } } or { "detail": "..." }
    if let Some(msg) = json.pointer("/detail/message").and_then(text) {
        return Some(msg);
    }
    if let Some(msg) = json.get("detail").and_then(text) {
        return Some(msg);
    }

    if let Some(msg) = json.get("message").and_then(text) {
        return Some(msg);
    }
    if let Some(msg) = json.get("error_description").and_then(text) {
        return Some(msg);
    }

    Some(truncate(trimmed))
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_RAW_ERROR_CHARS {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(MAX_RAW_ERROR_CHARS).collect();
        short.push('…');
        short
    }
}
