pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod extractors;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod security;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
mod tests;

pub use app::build_router;
pub use state::AppState;
