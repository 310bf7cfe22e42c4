//! Auth service configuration.

use std::path::PathBuf;

use common::StorageConfig;

/// Auth service configuration.
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// File holding the signed-in user between commands
    pub session_path: PathBuf,
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_storage(&StorageConfig::from_env())
    }

    pub fn from_storage(storage: &StorageConfig) -> Self {
        Self {
            session_path: storage.session_path(),
        }
    }
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self::from_storage(&StorageConfig::default())
    }
}
