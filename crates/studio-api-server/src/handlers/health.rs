use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: &'static str,
    database: &'static str,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Ready only when the database answers a ping.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match state.stores.as_ref() {
        None => "not_configured",
        Some(stores) => match stores.schema.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                warn!("Readiness ping failed: {}", e);
                "unreachable"
            }
        },
    };

    if database == "ok" {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                database,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database,
            }),
        )
    }
}
