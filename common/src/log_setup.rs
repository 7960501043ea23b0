use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Rotation, RollingFileAppender};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "voronoi";
const MAX_LOG_FILES: usize = 5;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Failed to create log directory '{}': {source}", .dir.display())]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("Logging already initialized")]
    AlreadyInitialized,
}

/// Installs the global subscriber: console output plus a daily rolling file
/// `voronoi.<date>.log` in `log_dir`, keeping the last few files.
///
/// `RUST_LOG` overrides `base_level` when set. Warnings and errors go to
/// stderr, everything else to stdout.
pub fn setup_logging(base_level: &str, log_dir: impl AsRef<Path>) -> Result<(), LogSetupError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(base_level).map_err(|source| LogSetupError::InvalidFilter {
            filter: base_level.to_string(),
            source,
        })?,
    };

    let file_writer = rolling_file_writer(log_dir.as_ref())?;
    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_thread_names(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}

fn rolling_file_writer(
    log_dir: &Path,
) -> Result<tracing_appender::non_blocking::NonBlocking, LogSetupError> {
    std::fs::create_dir_all(log_dir).map_err(|source| LogSetupError::CreateDir {
        dir: log_dir.to_path_buf(),
        source,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_output_path;

    #[test]
    fn setup_writes_to_given_directory_once() {
        let log_dir = test_output_path("logs");
        setup_logging("debug", &log_dir).unwrap();
        tracing::info!(target: "voronoi", "logging initialized");

        assert!(log_dir.is_dir());
        assert!(LOG_GUARD.get().is_some());
        assert!(matches!(
            setup_logging("debug", &log_dir),
            Err(LogSetupError::AlreadyInitialized)
        ));
    }

    #[test]
    fn unwritable_directory_is_reported() {
        let file = test_output_path("log_dir_is_a_file");
        std::fs::write(&file, "").unwrap();
        assert!(matches!(
            rolling_file_writer(&file.join("nested")),
            Err(LogSetupError::CreateDir { .. })
        ));
    }
}
