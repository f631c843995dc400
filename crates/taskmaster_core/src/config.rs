//! Core configuration.
//!
//! # Responsibility
//! - Hold per-mutator behaviour switches.
//! - Resolve process-level runtime settings from environment variables.
//!
//! # Invariants
//! - Unknown or malformed values are rejected, never silently defaulted.
//! - An unset or blank variable falls back to its default.

use crate::logging::{LogLevel, LogLevelError};
use crate::model::entity::TEMPORARY_ID_PREFIX;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_LOG_LEVEL: &str = "TASKMASTER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKMASTER_LOG_DIR";
pub const ENV_UPDATE_MODE: &str = "TASKMASTER_UPDATE_MODE";
pub const ENV_REMOTE_LATENCY_MS: &str = "TASKMASTER_REMOTE_LATENCY_MS";

/// How `update` treats the local store while its remote call is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Store changes only after the remote call succeeds.
    #[default]
    Confirmed,
    /// Patch is applied locally first and rolled back on failure.
    Optimistic,
}

impl UpdateMode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "optimistic" => Ok(Self::Optimistic),
            other => Err(ConfigError::InvalidValue {
                key: ENV_UPDATE_MODE,
                value: other.to_string(),
                expected: "confirmed|optimistic",
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Optimistic => "optimistic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}; expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("invalid log level for TASKMASTER_LOG_LEVEL: {0}")]
    LogLevel(#[from] LogLevelError),
    #[error("temporary id prefix must not be empty")]
    EmptyTemporaryPrefix,
}

/// Behaviour switches for one optimistic mutator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutatorConfig {
    pub update_mode: UpdateMode,
    /// Namespace for locally minted ids; must never match a server id.
    pub temporary_id_prefix: String,
}

impl Default for MutatorConfig {
    fn default() -> Self {
        Self {
            update_mode: UpdateMode::default(),
            temporary_id_prefix: TEMPORARY_ID_PREFIX.to_string(),
        }
    }
}

impl MutatorConfig {
    pub fn with_update_mode(mut self, update_mode: UpdateMode) -> Self {
        self.update_mode = update_mode;
        self
    }

    pub fn with_temporary_id_prefix(
        mut self,
        prefix: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let prefix = prefix.into();
        if prefix.trim().is_empty() {
            return Err(ConfigError::EmptyTemporaryPrefix);
        }
        self.temporary_id_prefix = prefix;
        Ok(self)
    }
}

/// Process-level settings for binaries embedding the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub log_level: LogLevel,
    /// `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
    pub update_mode: UpdateMode,
    /// Artificial latency for the in-process backend.
    pub remote_latency: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default_for_build(),
            log_dir: None,
            update_mode: UpdateMode::default(),
            remote_latency: None,
        }
    }
}

impl RuntimeConfig {
    /// Reads `TASKMASTER_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a key to its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = LogLevel::parse(&level)?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(mode) = read(ENV_UPDATE_MODE) {
            config.update_mode = UpdateMode::parse(&mode)?;
        }
        if let Some(raw) = read(ENV_REMOTE_LATENCY_MS) {
            let millis = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_REMOTE_LATENCY_MS,
                value: raw.clone(),
                expected: "a non-negative integer",
            })?;
            config.remote_latency = Some(Duration::from_millis(millis));
        }
        Ok(config)
    }

    pub fn mutator_config(&self) -> MutatorConfig {
        MutatorConfig::default().with_update_mode(self.update_mode)
    }
}
