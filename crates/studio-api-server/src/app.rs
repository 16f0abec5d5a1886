use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::state::AppState;

/// Every route answers exactly one method; anything else gets the 405 envelope.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.settings.server.body_limit_mb * 1024 * 1024;

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route(
            "/api/config/status",
            get(handlers::config_status::config_status_handler),
        );

    let provider_routes = Router::new()
        .route("/api/ai", post(handlers::ai::ai_handler))
        .route(
            "/api/images/generate",
            post(handlers::images::generate_image_handler),
        )
        .route("/api/tts", post(handlers::tts::tts_handler))
        .route("/api/tts/voices", get(handlers::tts::voices_handler))
        .route(
            "/api/media/search",
            get(handlers::media::media_search_handler),
        )
        .route(
            "/api/youtube/channel",
            get(handlers::youtube::channel_handler),
        )
        .route(
            "/api/youtube/trending",
            get(handlers::youtube::trending_handler),
        )
        .route("/api/youtube/search", get(handlers::youtube::search_handler))
        .route("/api/youtube/ideas", post(handlers::youtube::ideas_handler))
        .route(
            "/api/youtube/oauth/url",
            get(handlers::youtube::oauth_url_handler),
        )
        .route(
            "/api/youtube/oauth/token",
            post(handlers::youtube::oauth_token_handler),
        )
        .route("/api/youtube/upload", post(handlers::youtube::upload_handler));

    let account_routes = Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup_handler))
        .route("/api/auth/login", post(handlers::auth::login_handler))
        .route("/api/auth/logout", post(handlers::auth::logout_handler))
        .route("/api/auth/session", get(handlers::auth::session_handler))
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password_handler),
        )
        .route("/api/audit", post(handlers::audit::client_audit_handler));

    let operator_routes = Router::new()
        .route(
            "/api/admin/bootstrap",
            post(handlers::admin::bootstrap_handler),
        )
        .route(
            "/api/admin/reset-password",
            post(handlers::admin::reset_password_handler),
        )
        .route(
            "/api/admin/diagnostics",
            get(handlers::admin::diagnostics_handler),
        )
        .route(
            "/api/admin/audit-logs",
            get(handlers::admin::audit_logs_handler),
        )
        .route("/api/cron/cleanup", get(handlers::cron::cleanup_handler));

    Router::new()
        .merge(public_routes)
        .merge(provider_routes)
        .merge(account_routes)
        .merge(operator_routes)
        .fallback(handlers::fallback::not_found)
        .method_not_allowed_fallback(handlers::fallback::method_not_allowed)
        .with_state(state)
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(CatchPanicLayer::new())
        .layer(DefaultBodyLimit::max(body_limit))
}
