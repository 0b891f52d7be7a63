//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SCHEDULE_TRACKS_LOG` environment variable (e.g. "info", "debug")
//! 3. the level from the layout config
//!
//! Logs go to stderr so the rendered layout can be piped from stdout.

use tracing_subscriber::fmt;

use crate::config::LogLevel;

pub const LOG_ENV_VAR: &str = "SCHEDULE_TRACKS_LOG";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, config_level: LogLevel) {
    let level = resolve_level(
        cli_level,
        std::env::var(LOG_ENV_VAR).ok().as_deref(),
        config_level,
    );

    fmt()
        .with_max_level(tracing_level(level))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn resolve_level(
    cli_level: Option<LogLevel>,
    env_value: Option<&str>,
    config_level: LogLevel,
) -> LogLevel {
    cli_level
        .or_else(|| env_value.and_then(|s| s.parse().ok()))
        .unwrap_or(config_level)
}

fn tracing_level(level: LogLevel) -> tracing::Level {
    match level {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}
