use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigKey, EnvResolver, MissingConfig, Settings};
use crate::database::Stores;
use crate::logging::AuditLogger;
use crate::services::{
    AuthService, BootstrapService, CleanupService, ImageService, LlmService, MediaService,
    TtsService, YoutubeService,
};
use crate::utils::error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub env: EnvResolver,
    /// `None` when no database URL is configured.
    pub stores: Option<Stores>,
    pub llm_service: Arc<LlmService>,
    pub image_service: Arc<ImageService>,
    pub tts_service: Arc<TtsService>,
    pub media_service: Arc<MediaService>,
    pub youtube_service: Arc<YoutubeService>,
    pub bootstrap_service: Arc<BootstrapService>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        env: EnvResolver,
        stores: Option<Stores>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.http.timeout_seconds))
            .user_agent(concat!("studio-api-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let providers = settings.providers.clone();
        let models = settings.models.clone();

        Ok(Self {
            llm_service: Arc::new(LlmService::new(client.clone(), providers.clone(), models.clone())),
            image_service: Arc::new(ImageService::new(client.clone(), providers.clone(), models.clone())),
            tts_service: Arc::new(TtsService::new(client.clone(), providers.clone(), models)),
            media_service: Arc::new(MediaService::new(client.clone(), providers.clone())),
            youtube_service: Arc::new(YoutubeService::new(client, providers)),
            bootstrap_service: Arc::new(BootstrapService::new(env.clone(), &settings.auth)),
            settings: Arc::new(settings),
            env,
            stores,
        })
    }

    pub fn stores(&self) -> Result<&Stores, ApiError> {
        self.stores
            .as_ref()
            .ok_or_else(|| MissingConfig::from(ConfigKey::DatabaseUrl).into())
    }

    pub fn auth_service(&self) -> Result<AuthService, ApiError> {
        Ok(AuthService::new(self.stores()?, self.settings.auth.clone()))
    }

    pub fn cleanup_service(&self) -> Result<CleanupService, ApiError> {
        Ok(CleanupService::new(
            self.stores()?,
            self.settings.cleanup.audit_retention_days,
        ))
    }

    pub fn audit_logger(&self) -> Result<AuditLogger, ApiError> {
        Ok(AuditLogger::new(self.stores()?.audit.clone()))
    }
}
