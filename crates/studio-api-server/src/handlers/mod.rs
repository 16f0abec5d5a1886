pub mod admin;
pub mod ai;
pub mod audit;
pub mod auth;
pub mod config_status;
pub mod cron;
pub mod fallback;
pub mod health;
pub mod images;
pub mod media;
pub mod tts;
pub mod youtube;
