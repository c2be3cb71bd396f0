//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Resolve data directory, database file, log level and catalog paths.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Defaults never require network or user interaction.

use crate::logging::default_log_level;
use std::path::PathBuf;

const DATA_DIR_ENV: &str = "GUIDEBOOK_DATA_DIR";
const LOG_LEVEL_ENV: &str = "GUIDEBOOK_LOG_LEVEL";
const SIGHTS_PATH_ENV: &str = "GUIDEBOOK_SIGHTS_PATH";
const SOUVENIRS_PATH_ENV: &str = "GUIDEBOOK_SOUVENIRS_PATH";

const DEFAULT_DATA_DIR_NAME: &str = "guidebook";
const DEFAULT_DB_FILE_NAME: &str = "user_data.sqlite3";
const DEFAULT_SIGHTS_FILE_NAME: &str = "sights.json";
const DEFAULT_SOUVENIRS_FILE_NAME: &str = "souvenirs.json";

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Directory holding the database and logs.
    pub data_dir: PathBuf,
    pub db_file_name: String,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    pub sights_path: PathBuf,
    pub souvenirs_path: PathBuf,
}

impl CoreConfig {
    /// Builds defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            log_level: default_log_level().to_string(),
            sights_path: data_dir.join(DEFAULT_SIGHTS_FILE_NAME),
            souvenirs_path: data_dir.join(DEFAULT_SOUVENIRS_FILE_NAME),
            data_dir,
        }
    }

    /// Reads `GUIDEBOOK_*` variables on top of defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`CoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = read(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DATA_DIR_NAME));
        let mut config = Self::with_data_dir(data_dir);
        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        if let Some(path) = read(SIGHTS_PATH_ENV) {
            config.sights_path = PathBuf::from(path);
        }
        if let Some(path) = read(SOUVENIRS_PATH_ENV) {
            config.souvenirs_path = PathBuf::from(path);
        }
        config
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file_name)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
