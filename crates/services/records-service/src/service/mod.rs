//! Application services layer - Use cases and business logic.
//!
//! Each service owns one area of the document and works through the
//! shared `DocumentStore`. Services depend on the store, never on each
//! other; the container wires them together.

mod assistance_service;
mod backup_service;
mod beneficiary_service;
pub mod container;
mod employee_service;
mod operation_service;
mod report_service;
mod settings_service;
mod task_service;
mod user_service;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use assistance_service::{AssistanceManager, AssistanceQuery, AssistanceService, AssistanceSort};
pub use backup_service::{backup_file_name, BackupFormat, BackupManager, BackupService};
pub use beneficiary_service::{
    BeneficiaryDetails, BeneficiaryManager, BeneficiaryQuery, BeneficiaryRow, BeneficiarySaved,
    BeneficiaryService, BeneficiarySort, EmployeeSuggestion,
};
pub use employee_service::{
    EmployeeManager, EmployeeQuery, EmployeeService, EmployeeSort, EmployeeUpdated,
};
pub use operation_service::{
    OperationManager, OperationQuery, OperationRow, OperationSaved, OperationService,
    OperationSort,
};
pub use report_service::{
    describe_period, DashboardStats, IncentiveReport, IncentiveRow, IncentiveSummary, Placement,
    ReportManager, ReportService, SearchTarget,
};
pub use settings_service::{png_data_url, OrganizationSettings, SettingsManager, SettingsService};
pub use task_service::{TaskManager, TaskService};
pub use user_service::{UserManager, UserQuery, UserService, UserSort};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
