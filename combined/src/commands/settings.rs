//! Organization settings.

use serde_json::Value;
use tokio::fs;

use common::{AppError, AppResult};

use super::Context;
use crate::cli::SettingsAction;
use crate::output::to_value;

pub async fn execute(action: SettingsAction, ctx: &Context<'_>) -> AppResult<Value> {
    let settings = ctx.services.settings();

    let updated = match action {
        SettingsAction::Show => settings.get_settings().await?,
        SettingsAction::Name { name } => {
            settings.set_organization_name(&ctx.user().await?, &name).await?
        }
        SettingsAction::Logo { path } => {
            let png = fs::read(&path).await.map_err(|e| {
                AppError::BadRequest(format!("cannot read {}: {}", path.display(), e))
            })?;
            settings.set_logo(&ctx.user().await?, &png).await?
        }
        SettingsAction::ClearLogo => settings.clear_logo(&ctx.user().await?).await?,
    };
    to_value(&updated)
}
