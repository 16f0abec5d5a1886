use anyhow::Result;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logger() -> Result<()> {
    // Get log level from environment (default: info)
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,studio_api_server=debug".to_string());

    // json for deployments, pretty for local development
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    // Optional daily-rotated file output
    let file_appender = match std::env::var("LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => Some(
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("studio-api")
                .filename_suffix("log")
                .build(dir)?,
        ),
        _ => None,
    };

    let filter = EnvFilter::try_new(&log_level)?;

    match log_format.as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stdout)
                        .with_target(true)
                        .with_level(true),
                )
                .with(file_appender.map(|appender| {
                    fmt::layer()
                        .with_writer(appender)
                        .with_target(true)
                        .with_ansi(false)
                }))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stdout)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true),
                )
                .with(file_appender.map(|appender| {
                    fmt::layer()
                        .json()
                        .with_writer(appender)
                        .with_target(true)
                        .with_level(true)
                }))
                .init();
        }
    }

    Ok(())
}
