//! Backup, restore and export round trips.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use common::{AppError, StorageConfig};
use domain::{UserProfile, UserRole};
use records_service_lib::config::RecordsServiceConfig;
use records_service_lib::service::{
    BackupFormat, BeneficiaryQuery, ServiceContainer, Services,
};
use records_service_lib::types::DateRange;

async fn open_services(dir: &TempDir) -> Services {
    let config =
        RecordsServiceConfig::default().with_storage(StorageConfig::in_dir(dir.path()));
    records_service_lib::open(config).await.unwrap()
}

fn manager() -> UserProfile {
    UserProfile {
        id: 1,
        name: "Admin User".to_string(),
        mobile: "01000000000".to_string(),
        username: "Admin".to_string(),
        role: UserRole::Manager,
    }
}

#[tokio::test]
async fn test_json_backup_restores_the_same_document() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;
    let before = services.store().snapshot().await;

    let path = services.backups().backup(BackupFormat::Json, None).await.unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("backup-"));
    assert!(name.ends_with(".json"));
    assert!(path.starts_with(dir.path().join("backups")));

    services
        .employees()
        .set_frozen(&["28501010100111".to_string()], true)
        .await
        .unwrap();

    let report = services.backups().restore(&path).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(*services.store().snapshot().await, *before);
}

#[tokio::test]
async fn test_xlsx_backup_restores_records_and_keeps_logo() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;
    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(b"image");
    services.settings().set_logo(&manager(), &png).await.unwrap();
    let before = services.store().snapshot().await;

    let path = services
        .backups()
        .backup(BackupFormat::Xlsx, Some(dir.path().to_path_buf()))
        .await
        .unwrap();
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("backup-excel-"));

    services.assistance().delete_assistance_types(&[1, 2, 3]).await.unwrap();
    services.backups().restore(&path).await.unwrap();

    let after = services.store().snapshot().await;
    assert_eq!(after.assistance_types, before.assistance_types);
    assert_eq!(after.employees, before.employees);
    assert_eq!(after.operations.len(), before.operations.len());
    assert_eq!(after.organization_name, before.organization_name);
    assert_eq!(after.organization_logo, before.organization_logo);
}

#[tokio::test]
async fn test_restore_rejects_unknown_files() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let csv = dir.path().join("data.csv");
    tokio::fs::write(&csv, "a,b").await.unwrap();
    let err = services.backups().restore(&csv).await.unwrap_err();
    assert!(matches!(err, AppError::UnsupportedFileType(_)));

    let broken = dir.path().join("broken.JSON");
    tokio::fs::write(&broken, "{\"employees\": [").await.unwrap();
    let err = services.backups().restore(&broken).await.unwrap_err();
    assert!(matches!(err, AppError::CorruptFile(_)));

    let partial = dir.path().join("partial.json");
    tokio::fs::write(&partial, r#"{"employees": [], "beneficiaries": []}"#)
        .await
        .unwrap();
    let err = services.backups().restore(&partial).await.unwrap_err();
    assert!(matches!(err, AppError::CorruptFile(_)));

    // Nothing was applied
    assert_eq!(services.store().snapshot().await.employees.len(), 2);
}

#[tokio::test]
async fn test_auto_backup_runs_once_per_period() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;
    let now = Utc::now();

    let first = services.backups().auto_backup(now).await.unwrap();
    assert!(first.is_some());

    let soon = services
        .backups()
        .auto_backup(now + Duration::hours(1))
        .await
        .unwrap();
    assert!(soon.is_none());

    let later = services
        .backups()
        .auto_backup(now + Duration::hours(25))
        .await
        .unwrap();
    assert!(later.is_some());
}

#[tokio::test]
async fn test_auto_backup_ignores_a_garbled_timestamp() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;
    let marker = StorageConfig::in_dir(dir.path()).last_auto_backup_path();
    tokio::fs::write(&marker, "yesterday-ish").await.unwrap();

    let written = services.backups().auto_backup(Utc::now()).await.unwrap();
    assert!(written.is_some());
}

#[tokio::test]
async fn test_exports_write_workbooks() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let tables = services
        .reports()
        .report_workbook(DateRange::new(Some("2023-01-01".into()), None))
        .await
        .unwrap();
    let path = services
        .backups()
        .export_workbook("report", tables, None)
        .await
        .unwrap();
    assert!(tokio::fs::metadata(&path).await.unwrap().len() > 0);

    let tables = services
        .reports()
        .beneficiary_workbook(&BeneficiaryQuery::default())
        .await
        .unwrap();
    assert_eq!(tables[0].rows.len(), 3);
    let target = dir.path().join("list.xlsx");
    let path = services
        .backups()
        .export_workbook("beneficiaries", tables, Some(target.clone()))
        .await
        .unwrap();
    assert_eq!(path, target);
}
