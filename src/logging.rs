// src/logging.rs

use crate::cli::LogLevel;
use tracing_appender::non_blocking::WorkerGuard;
use std::path::Path;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE_NAME: &str = "changelog.log";

impl LogLevel {
    /// The `EnvFilter` directive for this level
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

/// Sets up tracing with two layers:
/// - Console (stderr): `level`, unless RUST_LOG is set
/// - File: same level, appended to the temp dir's `changelog.log`
///
/// The returned guard flushes the file layer when dropped.
pub fn init(level: LogLevel) -> Option<WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    match file_appender(&std::env::temp_dir()) {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(console)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(non_blocking)
                        .with_filter(EnvFilter::new(level.directive())),
                )
                .init();
            Some(guard)
        }
        Err(_) => {
            // console only
            tracing_subscriber::registry().with(console).init();
            None
        }
    }
}

/// Appends to `dir/changelog.log`, never rotating
fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(dir)
}
