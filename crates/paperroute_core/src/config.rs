//! Runtime configuration from environment variables.
//!
//! # Responsibility
//! - Resolve the database path, logging settings and remainder policy.
//! - Keep lookup injectable so resolution is testable without touching the
//!   process environment.

use crate::dispatch::RemainderPolicy;
use crate::logging::default_log_level;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DATABASE_PATH: &str = "PAPERROUTE_DATABASE_PATH";
pub const ENV_LOG_LEVEL: &str = "PAPERROUTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PAPERROUTE_LOG_DIR";
pub const ENV_REMAINDER_POLICY: &str = "PAPERROUTE_REMAINDER_POLICY";
pub const DEFAULT_DATABASE_PATH: &str = "paperroute.sqlite3";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

/// Resolved agency settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgencyConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    /// `None` logs to stderr.
    pub log_dir: Option<String>,
    pub remainder_policy: RemainderPolicy,
}

impl Default for AgencyConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            remainder_policy: RemainderPolicy::default(),
        }
    }
}

impl AgencyConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DATABASE_PATH) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR);
        if let Some(policy) = read(ENV_REMAINDER_POLICY) {
            config.remainder_policy = policy
                .parse::<RemainderPolicy>()
                .map_err(|message| ConfigError::InvalidValue {
                    var: ENV_REMAINDER_POLICY,
                    message,
                })?;
        }
        Ok(config)
    }
}
