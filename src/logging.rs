use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "extractor.log";
const DEFAULT_FILTER: &str = "event_ocr_extractor=info";

/// Initializes logging with console output and a daily-rotated JSON log file.
///
/// Keep the returned guard alive until exit so buffered file output is flushed.
pub fn init_logging() -> Option<WorkerGuard> {
    init_logging_in(Path::new(LOG_DIR))
}

/// Same as [`init_logging`], rotating log files inside `log_dir`.
pub fn init_logging_in(log_dir: &Path) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Console-only when the log directory cannot be created
    let (file_layer, guard, dir_error) = match fs::create_dir_all(log_dir) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().json().with_writer(non_blocking_writer);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    if let Some(e) = dir_error {
        tracing::warn!("File logging disabled, cannot create {}: {}", log_dir.display(), e);
    }

    guard
}
