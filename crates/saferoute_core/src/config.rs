//! Runtime configuration resolved from `SAFEROUTE_*` environment variables.
//!
//! # Invariants
//! - Every field has a usable default; only malformed values are errors.
//! - `log_dir = None` means logging stays disabled.

use crate::logging::default_log_level;
use crate::service::list_service::{normalize_report_limit, REPORT_LIST_LIMIT_MAX};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "SAFEROUTE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "SAFEROUTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SAFEROUTE_LOG_DIR";
pub const ENV_REPORT_LIST_LIMIT: &str = "SAFEROUTE_REPORT_LIST_LIMIT";

pub const DEFAULT_DB_FILE_NAME: &str = "saferoute.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    /// Default page size for report listing, already clamped.
    pub report_list_limit: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            report_list_limit: REPORT_LIST_LIMIT_MAX,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = get(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(raw) = get(ENV_REPORT_LIST_LIMIT) {
            let limit = raw.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_REPORT_LIST_LIMIT,
                value: raw.clone(),
            })?;
            config.report_list_limit = normalize_report_limit(Some(limit));
        }

        Ok(config)
    }
}
