//! Router-level tests: real handlers and extractors, in-memory repositories,
//! upstreams mocked with wiremock.

mod accounts;
mod routes;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::app::build_router;
use crate::config::{EnvResolver, Settings};
use crate::database::memory::MemoryStore;
use crate::state::AppState;

pub(crate) fn router(
    env: &[(&str, &str)],
    store: Option<&Arc<MemoryStore>>,
    configure: impl FnOnce(&mut Settings),
) -> Router {
    let mut settings = Settings::for_tests();
    configure(&mut settings);

    let state = AppState::new(
        settings,
        EnvResolver::from_pairs(env),
        store.map(|s| s.stores()),
    )
    .unwrap();
    build_router(state)
}

pub(crate) fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub(crate) async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub(crate) async fn get(router: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(router, request(Method::GET, uri, token, None)).await
}

pub(crate) async fn post(
    router: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    send(router, request(Method::POST, uri, token, Some(body))).await
}
