//! Shared configuration structures.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Persisted document file name inside the data directory
pub const DOCUMENT_FILE_NAME: &str = "charity-data.json";

/// Current session file name inside the data directory
pub const SESSION_FILE_NAME: &str = "session.json";

/// Last auto-backup timestamp file name inside the data directory
pub const LAST_AUTO_BACKUP_FILE_NAME: &str = "last-auto-backup";

/// Where the application keeps its files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the document, the session and the backup marker
    pub data_dir: PathBuf,
    /// Directory receiving backups and exports
    pub backup_dir: PathBuf,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env::var("CHARITY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            backup_dir: env::var("CHARITY_BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.backup_dir),
        }
    }

    /// Both directories rooted at `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            data_dir: dir.to_path_buf(),
            backup_dir: dir.join("backups"),
        }
    }

    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(DOCUMENT_FILE_NAME)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE_NAME)
    }

    pub fn last_auto_backup_path(&self) -> PathBuf {
        self.data_dir.join(LAST_AUTO_BACKUP_FILE_NAME)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            backup_dir: PathBuf::from("./backups"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("CHARITY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// `--verbose` overrides the configured level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        if verbose {
            self.log_level = "debug".to_string();
        }
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
