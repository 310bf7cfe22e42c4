//! Organization settings.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use tracing::info;

use common::{AppError, AppResult};
use domain::{UserProfile, LOGO_DATA_URL_PREFIX};

use crate::infra::DocumentStore;

/// First eight bytes of every PNG file
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationSettings {
    pub name: String,
    /// PNG data URL, empty when unset
    pub logo: String,
}

#[async_trait]
pub trait SettingsService: Send + Sync {
    async fn get_settings(&self) -> AppResult<OrganizationSettings>;

    async fn set_organization_name(&self, actor: &UserProfile, name: &str)
        -> AppResult<OrganizationSettings>;

    /// Store a PNG image as the organization logo.
    async fn set_logo(&self, actor: &UserProfile, png: &[u8]) -> AppResult<OrganizationSettings>;

    async fn clear_logo(&self, actor: &UserProfile) -> AppResult<OrganizationSettings>;
}

pub struct SettingsManager {
    store: Arc<DocumentStore>,
}

impl SettingsManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    async fn update<F>(&self, actor: &UserProfile, change: F) -> AppResult<OrganizationSettings>
    where
        F: FnOnce(&mut domain::Document) -> AppResult<()> + Send,
    {
        if !actor.is_manager() {
            return Err(AppError::forbidden("settings are reserved to managers"));
        }
        self.store
            .apply(move |doc| {
                change(doc)?;
                Ok(OrganizationSettings {
                    name: doc.organization_name.clone(),
                    logo: doc.organization_logo.clone(),
                })
            })
            .await
    }
}

/// Encode a PNG image as a data URL.
pub fn png_data_url(png: &[u8]) -> AppResult<String> {
    if !png.starts_with(PNG_SIGNATURE) {
        return Err(AppError::validation("logo: The logo must be a PNG image"));
    }
    Ok(format!("{}{}", LOGO_DATA_URL_PREFIX, STANDARD.encode(png)))
}

#[async_trait]
impl SettingsService for SettingsManager {
    async fn get_settings(&self) -> AppResult<OrganizationSettings> {
        let doc = self.store.snapshot().await;
        Ok(OrganizationSettings {
            name: doc.organization_name.clone(),
            logo: doc.organization_logo.clone(),
        })
    }

    async fn set_organization_name(
        &self,
        actor: &UserProfile,
        name: &str,
    ) -> AppResult<OrganizationSettings> {
        let name = name.to_string();
        let settings = self
            .update(actor, move |doc| Ok(doc.set_organization_name(&name)?))
            .await?;
        info!(name = %settings.name, "Organization name changed");
        Ok(settings)
    }

    async fn set_logo(&self, actor: &UserProfile, png: &[u8]) -> AppResult<OrganizationSettings> {
        let logo = png_data_url(png)?;
        let settings = self
            .update(actor, move |doc| {
                doc.organization_logo = logo;
                Ok(())
            })
            .await?;
        info!(bytes = png.len(), "Organization logo changed");
        Ok(settings)
    }

    async fn clear_logo(&self, actor: &UserProfile) -> AppResult<OrganizationSettings> {
        self.update(actor, |doc| {
            doc.organization_logo.clear();
            Ok(())
        })
        .await
    }
}
