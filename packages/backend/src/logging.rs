//! Process-wide tracing setup: an `EnvFilter`, a stdout layer and, when
//! [`LogConfig::file_dir`] is set, a daily-rotated file layer.

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// File name prefix; the appender adds the date suffix.
pub const LOG_FILE_PREFIX: &str = "studemy.log";

/// Flushes the file writer on drop; hold it until shutdown.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Filter for `level`, falling back to `info` on a malformed directive
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn file_writer(dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// Installs the global subscriber. A log directory that cannot be created
/// is reported on stderr and file logging is skipped.
pub fn init_tracing(config: &LogConfig) -> Option<FileLogGuard> {
    let file = config
        .file_dir
        .as_deref()
        .and_then(|dir| match file_writer(dir) {
            Ok(writer) => Some(writer),
            Err(err) => {
                eprintln!("file logging disabled, cannot use {}: {err}", dir.display());
                None
            }
        });

    let (file_layer, guard) = match file {
        Some((writer, guard)) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true)),
            Some(FileLogGuard { _guard: guard }),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    guard
}
