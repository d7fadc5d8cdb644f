//! Tracing setup
//!
//! Stdout always gets events; a daily-rolling file under `LogConfig::dir`
//! is added when file logging is enabled. A log directory that cannot be
//! created downgrades to stdout only instead of aborting the launcher.

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

const LOG_FILE_PREFIX: &str = "kids-english.log";
const FALLBACK_FILTER: &str = "info";

/// Keeps the non-blocking file writer flushing until dropped.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Installs the global subscriber. Returns a guard only when a file layer
/// is active; a second call is a no-op.
pub fn init_tracing(config: &LogConfig) -> Option<FileLogGuard> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER));

    let (file_layer, guard) = match file_writer(config) {
        Some((writer, guard)) => {
            let layer = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .is_ok();

    if !installed {
        return None;
    }
    guard.map(|guard| FileLogGuard { _guard: guard })
}

fn file_writer(config: &LogConfig) -> Option<(NonBlocking, WorkerGuard)> {
    if !config.file_logs {
        return None;
    }
    if let Err(err) = std::fs::create_dir_all(&config.dir) {
        eprintln!("failed to create log directory {}: {err}", config.dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}
