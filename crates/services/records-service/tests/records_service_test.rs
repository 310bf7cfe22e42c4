//! Service integration tests against a file-backed store.

use tempfile::TempDir;

use common::{AppError, StorageConfig};
use domain::{
    AssistanceTypeInput, BeneficiaryInput, CreateUser, EmployeeInput, MaritalStatus,
    OperationInput, OperationStatus, UpdateUser, UserProfile, UserRole,
};
use records_service_lib::config::RecordsServiceConfig;
use records_service_lib::service::{
    BeneficiaryQuery, EmployeeQuery, OperationQuery, ServiceContainer, Services,
};
use records_service_lib::types::PaginationParams;

const AHMED: &str = "28501010100111";
const FATMA: &str = "29002020100222";
const SARA: &str = "29503030100333";

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

fn clerk() -> UserProfile {
    UserProfile {
        id: 9,
        role: UserRole::User,
        ..manager()
    }
}

fn employee_input(national_id: &str, name: &str) -> EmployeeInput {
    EmployeeInput {
        name: name.to_string(),
        national_id: national_id.to_string(),
        phone: "01012340000".to_string(),
        governorate: "Cairo".to_string(),
        city: "Maadi".to_string(),
        area: "Degla".to_string(),
    }
}

fn beneficiary_input(national_id: &str, employee: Option<&str>) -> BeneficiaryInput {
    BeneficiaryInput {
        name: "Nour Hassan".to_string(),
        national_id: national_id.to_string(),
        join_date: "2024-01-20".to_string(),
        phone: "01122223333".to_string(),
        alternative_phone: None,
        governorate: "Cairo".to_string(),
        city: "Maadi".to_string(),
        area: "Degla".to_string(),
        detailed_address: "12 Street 9".to_string(),
        job: "Tailor".to_string(),
        family_members: 4,
        marital_status: MaritalStatus::Single,
        spouse_name: None,
        employee_national_id: employee.map(str::to_string),
        is_blacklisted: false,
        researcher_receipt_date: None,
        research_submission_date: None,
        research_result: None,
    }
}

fn operation_input(beneficiary: &str) -> OperationInput {
    OperationInput {
        beneficiary_national_id: beneficiary.to_string(),
        assistance_id: 1,
        amount: 250.0,
        date: "2024-02-01".to_string(),
        committee_number: None,
        committee_decision_description: None,
        spending_entity: "Donations".to_string(),
        details: None,
        status: OperationStatus::Pending,
        acceptance_date: None,
        pending_date: Some("2024-02-02".to_string()),
        disbursement_status: None,
        disbursement_date: None,
    }
}

#[tokio::test]
async fn test_employee_rename_moves_beneficiaries() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let updated = services
        .employees()
        .update_employee(AHMED, employee_input("28501010100999", "Ahmed Mahmoud"))
        .await
        .unwrap();
    assert_eq!(updated.beneficiaries_moved, 2);

    let sara = services.beneficiaries().get_beneficiary(SARA).await.unwrap();
    assert_eq!(sara.employee_national_id.as_deref(), Some("28501010100999"));
    assert!(services.employees().get_employee(AHMED).await.is_err());
}

#[tokio::test]
async fn test_freeze_hands_beneficiaries_to_volunteer() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let moved = services
        .employees()
        .set_frozen(&[FATMA.to_string()], true)
        .await
        .unwrap();
    assert_eq!(moved, 1);

    let b002 = services
        .beneficiaries()
        .get_beneficiary("29204040200444")
        .await
        .unwrap();
    assert!(b002.employee_national_id.is_none());

    // Unfreezing gives nothing back
    services
        .employees()
        .set_frozen(&[FATMA.to_string()], false)
        .await
        .unwrap();
    let b002 = services
        .beneficiaries()
        .get_beneficiary("29204040200444")
        .await
        .unwrap();
    assert!(b002.employee_national_id.is_none());
}

#[tokio::test]
async fn test_frozen_employee_cannot_take_beneficiaries() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;
    services
        .employees()
        .set_frozen(&[AHMED.to_string()], true)
        .await
        .unwrap();

    let err = services
        .beneficiaries()
        .add_beneficiary(beneficiary_input("30101010123456", Some(AHMED)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let created = services
        .beneficiaries()
        .add_beneficiary(beneficiary_input("30101010123456", None))
        .await
        .unwrap();
    assert!(created.employee_national_id.is_none());
}

#[tokio::test]
async fn test_duplicate_employee_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let err = services
        .employees()
        .add_employee(employee_input(AHMED, "Someone Else"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_codes_keep_increasing() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let first = services
        .beneficiaries()
        .add_beneficiary(beneficiary_input("30101010123456", Some(AHMED)))
        .await
        .unwrap();
    let second = services
        .beneficiaries()
        .add_beneficiary(beneficiary_input("30101010123457", Some(AHMED)))
        .await
        .unwrap();
    assert_eq!(first.code, "B004");
    assert_eq!(second.code, "B005");

    let op = services
        .operations()
        .add_operation(operation_input(&first.national_id))
        .await
        .unwrap();
    services.operations().delete_operation(1).await.unwrap();
    let next = services
        .operations()
        .add_operation(operation_input(&first.national_id))
        .await
        .unwrap();
    assert!(next.id > op.id);
    assert_ne!(next.code, op.code);
}

#[tokio::test]
async fn test_blacklisted_beneficiary_gets_no_operation() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let changed = services
        .beneficiaries()
        .set_blacklisted(&[SARA.to_string()], true)
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let err = services
        .operations()
        .add_operation(operation_input(SARA))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_operation_dates_follow_status() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let mut input = operation_input(SARA);
    input.acceptance_date = Some("2024-02-03".to_string());
    let op = services.operations().add_operation(input).await.unwrap();
    assert!(op.acceptance_date.is_none());
    assert_eq!(op.pending_date.as_deref(), Some("2024-02-02"));

    let mut missing = operation_input(SARA);
    missing.status = OperationStatus::Accepted;
    let err = services
        .operations()
        .add_operation(missing)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("acceptance_date"));
}

#[tokio::test]
async fn test_beneficiary_details_sum_disbursed_operations() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let details = services.beneficiaries().beneficiary_details(SARA).await.unwrap();
    // OP001 and OP004 are accepted, only OP001 is disbursed
    assert_eq!(details.accepted_operations, 2);
    assert_eq!(details.total_disbursed, 500.0);

    let history = services.operations().beneficiary_history(SARA).await.unwrap();
    assert_eq!(history.len(), 4);
    assert!(history[0].operation.date >= history[1].operation.date);
}

#[tokio::test]
async fn test_lists_paginate_and_filter() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let page = services
        .beneficiaries()
        .list_beneficiaries(BeneficiaryQuery {
            pagination: PaginationParams::new(2, 2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.data.len(), 1);

    let cairo = services
        .beneficiaries()
        .filter_beneficiaries(&BeneficiaryQuery {
            governorate: Some("القاهرة".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(cairo.len(), 2);

    let employees = services
        .employees()
        .list_employees(EmployeeQuery {
            search: Some("0112345".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(employees.meta.total, 1);
    assert_eq!(employees.data[0].national_id, FATMA);

    let newest = services
        .operations()
        .list_operations(OperationQuery::default())
        .await
        .unwrap();
    assert_eq!(newest.data[0].operation.code, "OP006");
}

#[tokio::test]
async fn test_assistance_ids_are_max_plus_one() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    services.assistance().delete_assistance_type(2).await.unwrap();
    let added = services
        .assistance()
        .add_assistance_type(AssistanceTypeInput::new("  Clothes "))
        .await
        .unwrap();
    assert_eq!(added.id, 4);
    assert_eq!(added.name, "Clothes");

    let err = services
        .assistance()
        .add_assistance_type(AssistanceTypeInput::new("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_admin_account_is_protected() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;
    let users = services.users();

    let err = users.delete_user(&manager(), 1).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = users.delete_users(&manager(), &[1]).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = users
        .update_user(
            &manager(),
            1,
            UpdateUser {
                name: "Admin".to_string(),
                mobile: "01000000000".to_string(),
                role: UserRole::User,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let removed = users.delete_users(&manager(), &[1, 2]).await.unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn test_user_management_needs_a_manager() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;

    let input = CreateUser {
        name: "Mai".to_string(),
        mobile: "01555555555".to_string(),
        username: "mai".to_string(),
        password: "secret".to_string(),
        role: UserRole::User,
    };
    let err = services
        .users()
        .create_user(&clerk(), input.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let created = services.users().create_user(&manager(), input.clone()).await.unwrap();
    assert_eq!(created.id, 3);

    let again = CreateUser {
        mobile: "01555555556".to_string(),
        username: "MAI".to_string(),
        ..input
    };
    let err = services.users().create_user(&manager(), again).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_arabic_usernames_are_distinct_accounts() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;
    let users = services.users();

    let input = |username: &str, mobile: &str| CreateUser {
        name: username.to_string(),
        mobile: mobile.to_string(),
        username: username.to_string(),
        password: "secret".to_string(),
        role: UserRole::User,
    };

    users.create_user(&manager(), input("سارة", "01555555551")).await.unwrap();
    let second = users
        .create_user(&manager(), input("محمد", "01555555552"))
        .await
        .unwrap();
    assert_eq!(second.username, "محمد");

    let err = users
        .create_user(&manager(), input(" سارة ", "01555555553"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_tasks_belong_to_their_owner() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;
    let tasks = services.tasks();

    let task = tasks.add_task(2, "  Call the committee ").await.unwrap();
    assert_eq!(task.text, "Call the committee");

    let err = tasks.toggle_task(1, task.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let toggled = tasks.toggle_task(2, task.id).await.unwrap();
    assert!(toggled.is_completed);

    let mine = tasks.list_tasks(1).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(!mine[0].is_completed);
    assert!(mine[1].is_completed);
}

#[tokio::test]
async fn test_changes_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let services = open_services(&dir).await;
    services
        .settings()
        .set_organization_name(&manager(), "  Hope Foundation ")
        .await
        .unwrap();
    services.save().await.unwrap();
    let before = services.store().snapshot().await;

    let reopened = open_services(&dir).await;
    let after = reopened.store().snapshot().await;
    assert_eq!(after.organization_name, "Hope Foundation");
    assert_eq!(*before, *after);
    assert!(!reopened.store().is_dirty());
}
