//! Core logging bootstrap.
//!
//! # Responsibility
//! - Initialize rolling file logs (or stderr) exactly once per process.
//! - Capture panics as metadata-only log events.
//!
//! # Invariants
//! - Initialization is idempotent for an identical config.
//! - Re-initialization with a different level or destination is rejected.
//! - Initialization never panics.
//! - Core log lines carry ids, kinds and status codes, never user content.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "taskmaster";
pub const DEFAULT_MAX_LOG_FILE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGING: OnceCell<ActiveLogging> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
pub struct LogLevelError(pub String);

impl LogLevel {
    /// Case-insensitive; accepts `warning` as an alias of `warn`.
    pub fn parse(value: &str) -> Result<Self, LogLevelError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(LogLevelError(other.to_string())),
        }
    }

    /// `debug` for debug builds, `info` for release builds.
    pub fn default_for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Info
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how verbosely core logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Absolute directory for rolling files; `None` writes to stderr.
    pub log_dir: Option<PathBuf>,
    pub max_file_bytes: u64,
    pub max_files: usize,
}

impl LoggingConfig {
    pub fn stderr(level: LogLevel) -> Self {
        Self {
            level,
            log_dir: None,
            max_file_bytes: DEFAULT_MAX_LOG_FILE_BYTES,
            max_files: DEFAULT_MAX_LOG_FILES,
        }
    }

    pub fn files(level: LogLevel, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: Some(log_dir.into()),
            ..Self::stderr(level)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("log_dir must be an absolute path, got `{}`", .0.display())]
    RelativeLogDir(PathBuf),
    #[error("failed to create log directory `{}`: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already initialized with {active}; refusing to switch to {requested}")]
    AlreadyInitialized { active: String, requested: String },
}

struct ActiveLogging {
    config: LoggingConfig,
    _handle: LoggerHandle,
}

/// Initializes core logging.
///
/// # Errors
/// - `RelativeLogDir` when `log_dir` is set but not absolute.
/// - `CreateDir` / `Backend` when the backend cannot be set up.
/// - `AlreadyInitialized` when a different config is already active.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    if let Some(dir) = &config.log_dir {
        validate_log_dir(dir)?;
    }

    let active = ACTIVE_LOGGING.get_or_try_init(|| start_backend(config))?;
    if active.config != *config {
        return Err(LoggingError::AlreadyInitialized {
            active: describe(&active.config),
            requested: describe(config),
        });
    }
    Ok(())
}

/// Returns `(level, log_dir)` of the active logger, if any.
pub fn logging_status() -> Option<(LogLevel, Option<PathBuf>)> {
    ACTIVE_LOGGING
        .get()
        .map(|active| (active.config.level, active.config.log_dir.clone()))
}

fn start_backend(config: &LoggingConfig) -> Result<ActiveLogging, LoggingError> {
    let logger = Logger::try_with_str(config.level.as_str())?;
    let handle = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                path: dir.clone(),
                source,
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(config.max_file_bytes),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(config.max_files),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()?
        }
        None => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format)
            .start()?,
    };

    install_panic_hook_once();
    info!(
        "event=core_init module=logging status=ok level={} sink={} version={}",
        config.level,
        if config.log_dir.is_some() { "file" } else { "stderr" },
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogging {
        config: config.clone(),
        _handle: handle,
    })
}

fn validate_log_dir(dir: &Path) -> Result<(), LoggingError> {
    if dir.is_absolute() {
        Ok(())
    } else {
        Err(LoggingError::RelativeLogDir(dir.to_path_buf()))
    }
}

fn describe(config: &LoggingConfig) -> String {
    match &config.log_dir {
        Some(dir) => format!("level `{}` at `{}`", config.level, dir.display()),
        None => format!("level `{}` on stderr", config.level),
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

/// Flattens line breaks and caps length at `max_chars`.
pub(crate) fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
