pub mod auth_service;
pub mod bootstrap_service;
pub mod cleanup_service;
pub mod image_service;
pub mod llm_service;
pub mod media_service;
pub mod prompts;
pub mod tts_service;
pub mod upstream;
pub mod youtube_service;

pub use auth_service::{AuthService, Authenticated, LoginResult};
pub use bootstrap_service::{BootstrapService, StepReport, StepsReport};
pub use cleanup_service::{CleanupReport, CleanupService};
pub use image_service::ImageService;
pub use llm_service::{Completion, CompletionRequest, LlmProvider, LlmService};
pub use media_service::MediaService;
pub use tts_service::TtsService;
pub use youtube_service::YoutubeService;
