use anyhow::Result;
use std::net::SocketAddr;
use tracing::{info, warn};

use studio_api_server::build_router;
use studio_api_server::config::{ConfigKey, EnvResolver, Settings};
use studio_api_server::database::{DbPool, Stores};
use studio_api_server::state::AppState;
use studio_api_server::utils::logger::init_logger;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (also reads .env)
    let settings = Settings::load()?;

    init_logger()?;
    info!("🚀 Starting Studio API Server...");
    info!("✅ Configuration loaded");

    let env = EnvResolver::from_process();

    // Lazy pool: the server starts even when the database is unreachable
    let stores = match env.lookup(ConfigKey::DatabaseUrl) {
        Some(url) => {
            let pool = DbPool::connect_lazy(&url, &settings.database)?;
            Some(Stores::postgres(pool))
        }
        None => {
            warn!("DATABASE_URL not set; auth, admin and cron routes will report not configured");
            None
        }
    };

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    let state = AppState::new(settings, env, stores)?;
    let app = build_router(state);

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
