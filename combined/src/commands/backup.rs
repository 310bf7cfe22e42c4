//! Backup, restore and export commands.

use chrono::Utc;
use serde_json::{json, Value};

use common::AppResult;

use super::{beneficiary, Context};
use crate::cli::{BackupArgs, ExportAction, RestoreArgs};
use crate::output::field;

pub async fn backup(args: BackupArgs, ctx: &Context<'_>) -> AppResult<Value> {
    let path = ctx.services.backups().backup(args.format, args.output).await?;
    Ok(field("written", path.display().to_string()))
}

pub async fn restore(args: RestoreArgs, ctx: &Context<'_>) -> AppResult<Value> {
    let report = ctx.services.backups().restore(&args.file).await?;
    Ok(json!({
        "restored": args.file.display().to_string(),
        "notices": report.notices(),
    }))
}

pub async fn export(action: ExportAction, ctx: &Context<'_>) -> AppResult<Value> {
    let reports = ctx.services.reports();
    let backups = ctx.services.backups();

    let path = match action {
        ExportAction::Report { period, output } => {
            let tables = reports.report_workbook(period.range()).await?;
            backups.export_workbook("report", tables, output).await?
        }
        ExportAction::Beneficiaries { filter, output } => {
            let tables = reports
                .beneficiary_workbook(&beneficiary::query(filter))
                .await?;
            backups.export_workbook("beneficiaries", tables, output).await?
        }
    };
    Ok(field("written", path.display().to_string()))
}

pub async fn auto_backup(ctx: &Context<'_>) -> AppResult<Value> {
    match ctx.services.backups().auto_backup(Utc::now()).await? {
        Some(path) => Ok(field("written", path.display().to_string())),
        None => Ok(Value::String("Automatic backup is up to date".to_string())),
    }
}
