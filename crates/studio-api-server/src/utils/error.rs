use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::MissingConfig;
use crate::database::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0} is not configured")]
    MissingConfiguration(MissingConfig),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{provider} error ({status}): {message}")]
    Upstream {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} unreachable: {message}")]
    UpstreamUnavailable {
        provider: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    aliases: Option<Vec<&'static str>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ApiError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed => "method_not_allowed",
            ApiError::MissingConfiguration(_) => "not_configured",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Upstream { .. } => "upstream_error",
            ApiError::UpstreamUnavailable { .. } => "upstream_unavailable",
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Message shown to clients. Database and internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::MethodNotAllowed => "Method not allowed".to_string(),
            ApiError::MissingConfiguration(missing) => {
                format!("{} is not configured", missing.key)
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::Upstream { message, .. } => message.clone(),
            ApiError::UpstreamUnavailable { provider, .. } => {
                format!("Failed to reach {}", provider)
            }
            ApiError::Database(_) => "Database operation failed".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<MissingConfig> for ApiError {
    fn from(missing: MissingConfig) -> Self {
        ApiError::MissingConfiguration(missing)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Database(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        } else {
            tracing::warn!(code = self.code(), "{}", self);
        }

        let aliases = match &self {
            ApiError::MissingConfiguration(missing) => Some(missing.aliases.clone()),
            _ => None,
        };

        let body = Json(ErrorResponse {
            error: self.public_message(),
            code: self.code(),
            aliases,
        });

        (status, body).into_response()
    }
}
