//! Records service configuration.

use std::env;
use std::path::PathBuf;

use common::StorageConfig;

/// Records service configuration.
#[derive(Debug, Clone)]
pub struct RecordsServiceConfig {
    /// Data and backup directories
    pub storage: StorageConfig,
    /// Optional seed document replacing the built-in data set
    pub seed_file: Option<PathBuf>,
    /// Organization name override for a freshly seeded document
    pub organization_name: Option<String>,
    /// Age after which the automatic backup runs again
    pub auto_backup_hours: i64,
}

impl RecordsServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            storage: StorageConfig::from_env(),
            seed_file: env::var("CHARITY_SEED_FILE").ok().map(PathBuf::from),
            organization_name: env::var("CHARITY_ORG_NAME")
                .ok()
                .filter(|n| !n.trim().is_empty()),
            auto_backup_hours: env::var("CHARITY_AUTO_BACKUP_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(24),
        }
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }
}

impl Default for RecordsServiceConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            seed_file: None,
            organization_name: None,
            auto_backup_hours: 24,
        }
    }
}
