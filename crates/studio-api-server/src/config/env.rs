//! Credential lookup with alias support.
//!
//! Every third-party credential has one canonical name plus the alternate
//! names deployments have historically used for it (`VITE_*` copies, vendor
//! spellings, platform-provided database URLs). Lookups walk the list in
//! order and take the first non-empty value.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Canonical configuration keys resolved from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    OpenAiApiKey,
    AnthropicApiKey,
    GeminiApiKey,
    ElevenLabsApiKey,
    PexelsApiKey,
    PixabayApiKey,
    YoutubeApiKey,
    YoutubeClientId,
    YoutubeClientSecret,
    YoutubeRedirectUri,
    DatabaseUrl,
    CronSecret,
    AdminSetupSecret,
    AdminEmail,
    AdminPassword,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 15] = [
        Self::OpenAiApiKey,
        Self::AnthropicApiKey,
        Self::GeminiApiKey,
        Self::ElevenLabsApiKey,
        Self::PexelsApiKey,
        Self::PixabayApiKey,
        Self::YoutubeApiKey,
        Self::YoutubeClientId,
        Self::YoutubeClientSecret,
        Self::YoutubeRedirectUri,
        Self::DatabaseUrl,
        Self::CronSecret,
        Self::AdminSetupSecret,
        Self::AdminEmail,
        Self::AdminPassword,
    ];

    pub fn canonical(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted names in priority order. The canonical name is always first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAiApiKey => &["OPENAI_API_KEY", "OPENAI_KEY", "VITE_OPENAI_API_KEY"],
            Self::AnthropicApiKey => &[
                "ANTHROPIC_API_KEY",
                "CLAUDE_API_KEY",
                "VITE_ANTHROPIC_API_KEY",
            ],
            Self::GeminiApiKey => &[
                "GEMINI_API_KEY",
                "GOOGLE_AI_API_KEY",
                "GOOGLE_GENERATIVE_AI_API_KEY",
                "VITE_GEMINI_API_KEY",
            ],
            Self::ElevenLabsApiKey => &[
                "ELEVENLABS_API_KEY",
                "ELEVEN_LABS_API_KEY",
                "XI_API_KEY",
                "VITE_ELEVENLABS_API_KEY",
            ],
            Self::PexelsApiKey => &["PEXELS_API_KEY", "VITE_PEXELS_API_KEY"],
            Self::PixabayApiKey => &["PIXABAY_API_KEY", "VITE_PIXABAY_API_KEY"],
            Self::YoutubeApiKey => &[
                "YOUTUBE_API_KEY",
                "YT_API_KEY",
                "GOOGLE_API_KEY",
                "VITE_YOUTUBE_API_KEY",
            ],
            Self::YoutubeClientId => &["YOUTUBE_CLIENT_ID", "GOOGLE_CLIENT_ID"],
            Self::YoutubeClientSecret => &["YOUTUBE_CLIENT_SECRET", "GOOGLE_CLIENT_SECRET"],
            Self::YoutubeRedirectUri => &["YOUTUBE_REDIRECT_URI", "GOOGLE_REDIRECT_URI"],
            Self::DatabaseUrl => &[
                "DATABASE_URL",
                "POSTGRES_URL",
                "POSTGRES_PRISMA_URL",
                "NEON_DATABASE_URL",
            ],
            Self::CronSecret => &["CRON_SECRET"],
            Self::AdminSetupSecret => &["ADMIN_SETUP_SECRET", "SETUP_SECRET"],
            Self::AdminEmail => &["ADMIN_EMAIL", "DEFAULT_ADMIN_EMAIL"],
            Self::AdminPassword => &["ADMIN_PASSWORD", "DEFAULT_ADMIN_PASSWORD"],
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing configuration: {key} (checked {})", .aliases.join(", "))]
pub struct MissingConfig {
    pub key: &'static str,
    pub aliases: Vec<&'static str>,
}

impl From<ConfigKey> for MissingConfig {
    fn from(key: ConfigKey) -> Self {
        Self {
            key: key.canonical(),
            aliases: key.aliases().to_vec(),
        }
    }
}

/// Where raw variable values come from.
pub trait EnvSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the process environment (after `.env` has been loaded).
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

#[derive(Clone)]
pub struct EnvResolver {
    source: Arc<dyn EnvSource>,
}

impl EnvResolver {
    pub fn new(source: Arc<dyn EnvSource>) -> Self {
        Self { source }
    }

    pub fn from_process() -> Self {
        Self::new(Arc::new(ProcessEnv))
    }

    /// First present, non-empty value among the key's aliases.
    pub fn resolve(&self, key: ConfigKey) -> Result<String, MissingConfig> {
        self.lookup(key).ok_or_else(|| MissingConfig::from(key))
    }

    pub fn lookup(&self, key: ConfigKey) -> Option<String> {
        key.aliases().iter().find_map(|name| {
            self.source
                .get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
    }

    pub fn is_configured(&self, key: ConfigKey) -> bool {
        self.lookup(key).is_some()
    }
}

#[cfg(test)]
impl EnvResolver {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::new(Arc::new(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_wins_over_alias() {
        let env = EnvResolver::from_pairs(&[
            ("OPENAI_API_KEY", "sk-canonical"),
            ("VITE_OPENAI_API_KEY", "sk-vite"),
        ]);

        assert_eq!(env.resolve(ConfigKey::OpenAiApiKey).unwrap(), "sk-canonical");
    }

    #[test]
    fn test_falls_through_to_first_present_alias() {
        let env = EnvResolver::from_pairs(&[
            ("POSTGRES_PRISMA_URL", "postgres://prisma"),
            ("NEON_DATABASE_URL", "postgres://neon"),
        ]);

        assert_eq!(
            env.resolve(ConfigKey::DatabaseUrl).unwrap(),
            "postgres://prisma"
        );
    }

    #[test]
    fn test_empty_and_blank_values_are_skipped() {
        let env = EnvResolver::from_pairs(&[
            ("ELEVENLABS_API_KEY", ""),
            ("ELEVEN_LABS_API_KEY", "   "),
            ("XI_API_KEY", " xi-key "),
        ]);

        assert_eq!(env.resolve(ConfigKey::ElevenLabsApiKey).unwrap(), "xi-key");
    }

    #[test]
    fn test_missing_key_names_canonical_and_aliases() {
        let env = EnvResolver::from_pairs(&[]);

        let err = env.resolve(ConfigKey::AnthropicApiKey).unwrap_err();
        assert_eq!(err.key, "ANTHROPIC_API_KEY");
        assert_eq!(
            err.aliases,
            vec!["ANTHROPIC_API_KEY", "CLAUDE_API_KEY", "VITE_ANTHROPIC_API_KEY"]
        );

        let message = err.to_string();
        assert!(message.contains("ANTHROPIC_API_KEY"));
        assert!(message.contains("CLAUDE_API_KEY"));
        assert!(!env.is_configured(ConfigKey::AnthropicApiKey));
    }

    #[test]
    fn test_alias_tables_start_with_canonical_and_have_no_duplicates() {
        for key in ConfigKey::ALL {
            let aliases = key.aliases();
            assert_eq!(aliases[0], key.canonical());

            let mut seen = std::collections::HashSet::new();
            for name in aliases {
                assert!(seen.insert(*name), "{} listed twice for {}", name, key);
            }
        }
    }
}
