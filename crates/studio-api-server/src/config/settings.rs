use anyhow::Result;
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub auth: AuthConfig,
    pub cleanup: CleanupConfig,
    pub providers: ProvidersConfig,
    pub models: ModelsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_mb: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub min_password_length: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CleanupConfig {
    pub audit_retention_days: i64,
}

/// Base URLs of every upstream. Overridable so tests can point them at a mock server.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub anthropic_version: String,
    pub gemini_base_url: String,
    pub elevenlabs_base_url: String,
    pub pexels_base_url: String,
    pub pixabay_base_url: String,
    pub youtube_api_base_url: String,
    pub youtube_upload_base_url: String,
    pub google_oauth_url: String,
    pub google_token_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelsConfig {
    pub openai_chat: String,
    pub anthropic_chat: String,
    pub gemini_chat: String,
    pub openai_image: String,
    pub openai_tts: String,
    pub openai_tts_voice: String,
    pub elevenlabs_tts: String,
    pub elevenlabs_voice_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::defaults()?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("STUDIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.body_limit_mb", 100)?
            .set_default("database.pool_max_size", 5)?
            .set_default("database.pool_timeout_seconds", 5)?
            .set_default("http.timeout_seconds", 60)?
            .set_default("auth.session_ttl_hours", 168)?
            .set_default("auth.bcrypt_cost", 12)?
            .set_default("auth.min_password_length", 8)?
            .set_default("cleanup.audit_retention_days", 90)?
            .set_default("providers.openai_base_url", "https://api.openai.com")?
            .set_default("providers.anthropic_base_url", "https://api.anthropic.com")?
            .set_default("providers.anthropic_version", "2023-06-01")?
            .set_default(
                "providers.gemini_base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("providers.elevenlabs_base_url", "https://api.elevenlabs.io")?
            .set_default("providers.pexels_base_url", "https://api.pexels.com")?
            .set_default("providers.pixabay_base_url", "https://pixabay.com")?
            .set_default("providers.youtube_api_base_url", "https://www.googleapis.com")?
            .set_default("providers.youtube_upload_base_url", "https://www.googleapis.com")?
            .set_default(
                "providers.google_oauth_url",
                "https://accounts.google.com/o/oauth2/v2/auth",
            )?
            .set_default("providers.google_token_url", "https://oauth2.googleapis.com/token")?
            .set_default("models.openai_chat", "gpt-4o-mini")?
            .set_default("models.anthropic_chat", "claude-3-5-sonnet-latest")?
            .set_default("models.gemini_chat", "gemini-1.5-flash")?
            .set_default("models.openai_image", "dall-e-3")?
            .set_default("models.openai_tts", "tts-1")?
            .set_default("models.openai_tts_voice", "alloy")?
            .set_default("models.elevenlabs_tts", "eleven_multilingual_v2")?
            .set_default("models.elevenlabs_voice_id", "21m00Tcm4TlvDq8ikWAM")?
            .set_default("models.max_tokens", 1500)?
            .set_default("models.temperature", 0.7)?;

        Ok(builder)
    }

    /// Built-in defaults only, no file or environment sources.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let config = Self::defaults()
            .expect("defaults must build")
            .set_override("auth.bcrypt_cost", 4)
            .expect("override must apply")
            .build()
            .expect("config must build");

        config
            .try_deserialize()
            .expect("default settings must deserialize")
    }
}
