//! Log sink selection.
//!
//! Debug mode logs to stdout at `debug`; otherwise logs are appended to the
//! configured log file through a non-blocking writer. `RUST_LOG` overrides
//! the default level either way.

use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::PlumberConfig;
use crate::error::ConfigError;

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the life of the process.
pub fn init(config: &PlumberConfig) -> Result<Option<WorkerGuard>, ConfigError> {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.debug {
        builder
            .with_writer(std::io::stdout)
            .try_init()
            .map_err(|e| ConfigError::Logging(e.to_string()))?;
        return Ok(None);
    }

    let file = open_log_file(&config.log_file)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    builder
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;
    Ok(Some(guard))
}

/// Open the log file for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> Result<File, ConfigError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ConfigError::LogSink {
            path: path.to_path_buf(),
            source,
        })
}
