//! Records Service Library
//!
//! Owns the charity document: employees, beneficiaries, assistance types,
//! operations, users, tasks and organization settings. It loads and repairs
//! the persisted document, applies every mutation through the services in
//! [`service`], and reads and writes JSON and XLSX backups.

pub mod config;
pub mod infra;
pub mod repository;
pub mod restore;
pub mod service;
pub mod spreadsheet;
pub mod types;

use std::sync::Arc;

use tokio::fs;
use tracing::info;

use common::{AppError, AppResult};
use domain::SeedData;

use crate::config::RecordsServiceConfig;
use crate::infra::DocumentStore;
use crate::repository::JsonFileStore;
use crate::service::Services;

/// Seed data from the configured file, or the built-in set.
pub async fn load_seed(config: &RecordsServiceConfig) -> AppResult<SeedData> {
    let mut seed = match &config.seed_file {
        Some(path) => {
            let text = fs::read_to_string(path).await.map_err(|e| {
                AppError::internal(format!("cannot read seed file {}: {}", path.display(), e))
            })?;
            info!(path = %path.display(), "Using seed file");
            SeedData::from_json(&text)?
        }
        None => SeedData::builtin(),
    };
    if let Some(name) = &config.organization_name {
        seed.organization_name = name.trim().to_string();
    }
    Ok(seed)
}

/// Open the persisted document and build every service around it.
pub async fn open(config: RecordsServiceConfig) -> AppResult<Services> {
    let seed = load_seed(&config).await?;
    let path = config.storage.document_path();
    info!(path = %path.display(), "Opening document");

    let repo = Arc::new(JsonFileStore::new(path));
    let store = Arc::new(DocumentStore::open(repo, seed).await?);
    Ok(Services::from_store(store, &config))
}
