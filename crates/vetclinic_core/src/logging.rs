//! Core logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend behind the `log` facade exactly once
//!   per process, writing rotating files or to stderr.
//! - Keep error text that ends up in log lines on a single, bounded line.
//!
//! # Invariants
//! - Initialization is idempotent for an identical config.
//! - A second, different config is rejected instead of silently applied.
//! - Initialization never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "vetclinic";
const DEFAULT_MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    config: LogConfig,
    _logger: LoggerHandle,
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of trace|debug|info|warn|error (`warning` is accepted).
    pub level: String,
    /// Absolute directory for rotating log files; `None` logs to stderr.
    pub directory: Option<PathBuf>,
    pub max_file_size_bytes: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            directory: None,
            max_file_size_bytes: DEFAULT_MAX_LOG_FILE_SIZE_BYTES,
            max_files: DEFAULT_MAX_LOG_FILES,
        }
    }
}

impl LogConfig {
    pub fn stderr(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    pub fn files(level: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            level: level.into(),
            directory: Some(directory.into()),
            ..Self::default()
        }
    }

    fn normalized(&self) -> Result<Self, LoggingError> {
        let level = normalize_level(&self.level)?;
        let directory = match self.directory.as_ref() {
            Some(dir) if !dir.is_absolute() => {
                return Err(LoggingError::RelativeDirectory(dir.clone()));
            }
            other => other.cloned(),
        };
        Ok(Self {
            level: level.to_string(),
            directory,
            ..self.clone()
        })
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    RelativeDirectory(PathBuf),
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(flexi_logger::FlexiLoggerError),
    /// Logging is already running with a different config.
    AlreadyInitialized {
        active: Box<LogConfig>,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDirectory(path) => write!(
                f,
                "log directory must be an absolute path, got `{}`",
                path.display()
            ),
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyInitialized { active } => write!(
                f,
                "logging already initialized with level `{}`; refusing to switch config",
                active.level
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Starts process-wide logging.
///
/// # Errors
/// - `UnsupportedLevel` / `RelativeDirectory` for a malformed config.
/// - `CreateDirectory` / `Backend` when the sink cannot be set up.
/// - `AlreadyInitialized` when a different config is already active.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let requested = config.normalized()?;

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(requested.clone()))?;
    if state.config != requested {
        return Err(LoggingError::AlreadyInitialized {
            active: Box::new(state.config.clone()),
        });
    }

    Ok(())
}

/// Returns the active config, or `None` before `init_logging` succeeded.
pub fn logging_status() -> Option<LogConfig> {
    LOGGING_STATE.get().map(|state| state.config.clone())
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(config: LogConfig) -> Result<LoggingState, LoggingError> {
    let logger = Logger::try_with_str(&config.level).map_err(LoggingError::Backend)?;

    let handle = match config.directory.as_ref() {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(config.max_file_size_bytes),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(config.max_files),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()
        }
        None => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format)
            .start(),
    }
    .map_err(LoggingError::Backend)?;

    info!(
        "event=core_init module=core status=ok level={} sink={} version={}",
        config.level,
        config
            .directory
            .as_ref()
            .map_or_else(|| "stderr".to_string(), |dir| dir.display().to_string()),
        env!("CARGO_PKG_VERSION")
    );

    Ok(LoggingState {
        config,
        _logger: handle,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

/// Flattens `value` onto one line and caps it at `max_chars` characters.
pub(crate) fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
