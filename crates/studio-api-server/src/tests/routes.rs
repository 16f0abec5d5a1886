use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{get, post, request, router, send};

const GET_ROUTES: &[&str] = &[
    "/health",
    "/health/ready",
    "/api/config/status",
    "/api/tts/voices",
    "/api/media/search",
    "/api/youtube/channel",
    "/api/youtube/trending",
    "/api/youtube/search",
    "/api/youtube/oauth/url",
    "/api/auth/session",
    "/api/admin/diagnostics",
    "/api/admin/audit-logs",
    "/api/cron/cleanup",
];

const POST_ROUTES: &[&str] = &[
    "/api/ai",
    "/api/images/generate",
    "/api/tts",
    "/api/youtube/ideas",
    "/api/youtube/oauth/token",
    "/api/youtube/upload",
    "/api/auth/signup",
    "/api/auth/login",
    "/api/auth/logout",
    "/api/auth/change-password",
    "/api/audit",
    "/api/admin/bootstrap",
    "/api/admin/reset-password",
];

#[tokio::test]
async fn test_every_route_rejects_other_methods() {
    let app = router(&[], None, |_| {});

    for uri in GET_ROUTES {
        for method in [Method::POST, Method::DELETE] {
            let (status, body) = send(&app, request(method.clone(), uri, None, None)).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
            assert_eq!(body["code"], "method_not_allowed", "{} {}", method, uri);
        }
    }

    for uri in POST_ROUTES {
        for method in [Method::GET, Method::PUT] {
            let (status, body) = send(&app, request(method.clone(), uri, None, None)).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
            assert_eq!(body["error"], "Method not allowed", "{} {}", method, uri);
        }
    }
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let app = router(&[], None, |_| {});

    let (status, body) = get(&app, "/api/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_health_and_readiness_without_database() {
    let app = router(&[], None, |_| {});

    let (status, body) = get(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&app, "/health/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "not_configured");
}

#[tokio::test]
async fn test_config_status_reports_booleans_only() {
    let app = router(
        &[
            ("VITE_OPENAI_API_KEY", "sk-secret"),
            ("YOUTUBE_CLIENT_ID", "client"),
            ("YOUTUBE_CLIENT_SECRET", "secret"),
        ],
        None,
        |_| {},
    );

    let (status, body) = get(&app, "/api/config/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["providers"]["openai"], true);
    assert_eq!(body["providers"]["anthropic"], false);
    assert_eq!(body["providers"]["youtube_oauth"], false);
    assert_eq!(body["database"], false);
    assert!(!body.to_string().contains("sk-secret"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request_envelope() {
    let app = router(&[("OPENAI_API_KEY", "sk-test")], None, |_| {});

    let (status, body) = post(&app, "/api/ai", None, json!({ "action": "dance" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}
