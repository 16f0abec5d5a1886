pub mod env;
pub mod settings;

pub use env::{ConfigKey, EnvResolver, EnvSource, MissingConfig, ProcessEnv};
pub use settings::*;
