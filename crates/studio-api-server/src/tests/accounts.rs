use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{get, post, router};
use crate::database::memory::MemoryStore;

fn app() -> (Router, Arc<MemoryStore>) {
    let store = MemoryStore::with_schema();
    (router(&[], Some(&store), |_| {}), store)
}

async fn signup(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = post(
        app,
        "/api/auth/signup",
        None,
        json!({ "email": email, "password": password, "display_name": "Maker" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn test_login_session_logout_flow() {
    let (app, store) = app();
    signup(&app, "maker@studio.test", "correct-horse").await;

    let (status, body) = post(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": "Maker@Studio.test", "password": "correct-horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_login"], false);
    assert!(body["user"].get("password_hash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = get(&app, "/api/auth/session", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "maker@studio.test");

    let (status, body) = post(&app, "/api/auth/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, _) = get(&app, "/api/auth/session", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let actions: Vec<String> = store.audit_entries().into_iter().map(|e| e.action).collect();
    assert_eq!(actions, vec!["signup", "login", "logout"]);
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable_and_audited() {
    let (app, store) = app();
    signup(&app, "maker@studio.test", "correct-horse").await;

    let (status, wrong_password) = post(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": "maker@studio.test", "password": "battery-staple" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = post(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": "ghost@studio.test", "password": "battery-staple" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["error"], "Invalid email or password");
    assert_eq!(wrong_password, unknown_user);

    let failed = store
        .audit_entries()
        .into_iter()
        .filter(|e| e.action == "login" && !e.success)
        .count();
    assert_eq!(failed, 2);
}

#[tokio::test]
async fn test_signup_rejects_duplicates_and_short_passwords() {
    let (app, _store) = app();
    signup(&app, "maker@studio.test", "correct-horse").await;

    let (status, body) = post(
        &app,
        "/api/auth/signup",
        None,
        json!({ "email": "MAKER@studio.test", "password": "correct-horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, _) = post(
        &app,
        "/api/auth/signup",
        None,
        json!({ "email": "other@studio.test", "password": "short" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        &app,
        "/api/auth/signup",
        None,
        json!({ "email": "not-an-email", "password": "correct-horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email must be a valid address");
}

#[tokio::test]
async fn test_disabled_account_cannot_log_in() {
    let (app, store) = app();
    signup(&app, "maker@studio.test", "correct-horse").await;
    store.set_active("maker@studio.test", false);

    let (status, body) = post(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": "maker@studio.test", "password": "correct-horse" }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[tokio::test]
async fn test_change_password_then_login_with_new_one() {
    let (app, _store) = app();
    let token = signup(&app, "maker@studio.test", "correct-horse").await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = post(
        &app,
        "/api/auth/change-password",
        Some(&token),
        json!({ "current_password": "wrong-guess", "new_password": "battery-staple" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post(
        &app,
        "/api/auth/change-password",
        Some(&token),
        json!({ "current_password": "correct-horse", "new_password": "battery-staple" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": "maker@studio.test", "password": "battery-staple" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_routes_require_bearer_token() {
    let (app, _store) = app();

    let (status, body) = get(&app, "/api/auth/session", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing bearer token");

    let (status, _) = get(&app, "/api/auth/session", Some("not-a-session")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_audit_entry_is_stored() {
    let (app, store) = app();
    let token = signup(&app, "maker@studio.test", "correct-horse").await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = post(
        &app,
        "/api/audit",
        Some(&token),
        json!({ "action": "export_video", "details": { "format": "mp4" } }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], true);

    let entry = store
        .audit_entries()
        .into_iter()
        .find(|e| e.action == "export_video")
        .unwrap();
    assert_eq!(entry.category, "client");
    assert!(entry.user_id.is_some());
    assert_eq!(entry.details.0["format"], "mp4");
}

#[tokio::test]
async fn test_client_audit_category_is_always_client() {
    let (app, store) = app();
    let token = signup(&app, "maker@studio.test", "correct-horse").await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = post(
        &app,
        "/api/audit",
        Some(&token),
        json!({ "action": "login", "category": "auth", "details": { "ok": true } }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let forged: Vec<_> = store
        .audit_entries()
        .into_iter()
        .filter(|e| e.action == "login")
        .collect();
    assert_eq!(forged.len(), 1);
    assert_eq!(forged[0].category, "client");
    assert_eq!(forged[0].details.0["client_category"], "auth");
}

#[tokio::test]
async fn test_auth_without_database_is_not_configured() {
    let app = router(&[], None, |_| {});

    let (status, body) = post(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": "maker@studio.test", "password": "correct-horse" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "DATABASE_URL is not configured");
}
