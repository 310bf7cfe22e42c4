//! Backup service - backups, restore, automatic backup and export files.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::fs;
use tracing::{debug, info, warn};

use common::{AppError, AppResult, StorageConfig};
use domain::DATE_FORMAT;

use crate::infra::DocumentStore;
use crate::repository::write_atomic;
use crate::restore::{RawDocument, RestoreReport};
use crate::spreadsheet::{backup_tables, read_backup, write_workbook, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupFormat {
    Json,
    Xlsx,
}

impl BackupFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xlsx => "xlsx",
        }
    }

    /// Format of an existing file, by extension, ignoring case.
    pub fn of_path(path: &Path) -> AppResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        extension
            .parse()
            .map_err(|_| AppError::UnsupportedFileType(path.display().to_string()))
    }
}

impl FromStr for BackupFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(format!("unknown backup format '{}'", other)),
        }
    }
}

#[async_trait]
pub trait BackupService: Send + Sync {
    /// Write a full backup. `destination` may be a directory or a file path;
    /// the backup directory is used when it is `None`.
    async fn backup(&self, format: BackupFormat, destination: Option<PathBuf>)
        -> AppResult<PathBuf>;

    /// Replace the document with the contents of a backup file.
    async fn restore(&self, path: &Path) -> AppResult<RestoreReport>;

    /// Write a JSON backup when the last automatic one is missing or stale.
    async fn auto_backup(&self, now: DateTime<Utc>) -> AppResult<Option<PathBuf>>;

    /// Write export tables to a workbook named `<stem>-<org>-<date>.xlsx`.
    async fn export_workbook(
        &self,
        stem: &str,
        tables: Vec<Table>,
        destination: Option<PathBuf>,
    ) -> AppResult<PathBuf>;
}

pub struct BackupManager {
    store: Arc<DocumentStore>,
    storage: StorageConfig,
    auto_backup_every: Duration,
}

impl BackupManager {
    pub fn new(store: Arc<DocumentStore>, storage: StorageConfig, auto_backup_hours: i64) -> Self {
        Self {
            store,
            storage,
            auto_backup_every: Duration::hours(auto_backup_hours),
        }
    }

    async fn target(&self, file_name: String, destination: Option<PathBuf>) -> PathBuf {
        match destination {
            None => self.storage.backup_dir.join(file_name),
            Some(dir) if fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) => {
                dir.join(file_name)
            }
            Some(path) => path,
        }
    }

    async fn last_auto_backup(&self) -> Option<DateTime<Utc>> {
        let path = self.storage.last_auto_backup_path();
        let text = fs::read_to_string(&path).await.ok()?;
        match DateTime::parse_from_rfc3339(text.trim()) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                warn!(error = %e, "Unreadable auto-backup timestamp; backing up again");
                None
            }
        }
    }
}

/// `<stem>-<organization>-<YYYY-MM-DD>.<extension>`
pub fn backup_file_name(stem: &str, organization: &str, date: DateTime<Utc>, extension: &str) -> String {
    let organization: String = organization
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect();
    format!("{}-{}-{}.{}", stem, organization, date.format(DATE_FORMAT), extension)
}

#[async_trait]
impl BackupService for BackupManager {
    async fn backup(
        &self,
        format: BackupFormat,
        destination: Option<PathBuf>,
    ) -> AppResult<PathBuf> {
        let doc = self.store.snapshot().await;
        let (stem, bytes) = match format {
            BackupFormat::Json => ("backup", serde_json::to_vec_pretty(&*doc)?),
            BackupFormat::Xlsx => ("backup-excel", write_workbook(backup_tables(&doc)?).await?),
        };

        let name = backup_file_name(stem, &doc.organization_name, Utc::now(), format.extension());
        let path = self.target(name, destination).await;
        write_atomic(&path, &bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), "Backup written");
        Ok(path)
    }

    async fn restore(&self, path: &Path) -> AppResult<RestoreReport> {
        let format = BackupFormat::of_path(path)?;
        let raw = match format {
            BackupFormat::Json => RawDocument::from_json_str(&fs::read_to_string(path).await?)?,
            BackupFormat::Xlsx => {
                let mut raw = read_backup(fs::read(path).await?).await?;
                // Workbooks do not carry the logo
                raw.organization_logo = Some(self.store.snapshot().await.organization_logo.clone());
                raw
            }
        };

        let report = self.store.restore(raw).await?;
        for notice in report.notices() {
            warn!("{}", notice);
        }
        info!(path = %path.display(), "Backup restored");
        Ok(report)
    }

    async fn auto_backup(&self, now: DateTime<Utc>) -> AppResult<Option<PathBuf>> {
        if let Some(last) = self.last_auto_backup().await {
            if now - last < self.auto_backup_every {
                debug!(last = %last, "Automatic backup is recent enough");
                return Ok(None);
            }
        }

        let path = self.backup(BackupFormat::Json, None).await?;
        write_atomic(&self.storage.last_auto_backup_path(), now.to_rfc3339().as_bytes()).await?;
        Ok(Some(path))
    }

    async fn export_workbook(
        &self,
        stem: &str,
        tables: Vec<Table>,
        destination: Option<PathBuf>,
    ) -> AppResult<PathBuf> {
        let organization = self.store.snapshot().await.organization_name.clone();
        let bytes = write_workbook(tables).await?;

        let name = backup_file_name(stem, &organization, Utc::now(), "xlsx");
        let path = self.target(name, destination).await;
        write_atomic(&path, &bytes).await?;

        info!(path = %path.display(), "Export written");
        Ok(path)
    }
}
