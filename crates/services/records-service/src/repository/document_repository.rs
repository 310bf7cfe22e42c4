//! Document repository backed by a JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use common::AppResult;
use domain::Document;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Persistence port for the single document.
///
/// `load_raw` hands back untrusted text; the store reconciles it before use.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Raw persisted document, `None` when nothing was saved yet
    async fn load_raw(&self) -> AppResult<Option<String>>;

    /// Replace the persisted document
    async fn save(&self, document: &Document) -> AppResult<()>;
}

/// Concrete implementation of DocumentRepository on the local filesystem
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create new repository instance
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentRepository for JsonFileStore {
    async fn load_raw(&self) -> AppResult<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, document: &Document) -> AppResult<()> {
        let json = serde_json::to_vec_pretty(document)?;
        write_atomic(&self.path, &json).await?;
        debug!(path = %self.path.display(), bytes = json.len(), "Document saved");
        Ok(())
    }
}

/// Write `bytes` next to `path` and rename over it.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
