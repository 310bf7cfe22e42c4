//! Service Container - Centralized service access.
//!
//! Every service shares one `DocumentStore`; the container is the only
//! place that knows the concrete implementations.

use std::future::Future;
use std::sync::Arc;

use super::{
    AssistanceManager, AssistanceService, BackupManager, BackupService, BeneficiaryManager,
    BeneficiaryService, EmployeeManager, EmployeeService, OperationManager, OperationService,
    ReportManager, ReportService, SettingsManager, SettingsService, TaskManager, TaskService,
    UserManager, UserService,
};
use crate::config::RecordsServiceConfig;
use crate::infra::DocumentStore;
use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn employees(&self) -> Arc<dyn EmployeeService>;

    fn beneficiaries(&self) -> Arc<dyn BeneficiaryService>;

    fn assistance(&self) -> Arc<dyn AssistanceService>;

    fn operations(&self) -> Arc<dyn OperationService>;

    fn tasks(&self) -> Arc<dyn TaskService>;

    /// Manager-only account administration
    fn users(&self) -> Arc<dyn UserService>;

    fn settings(&self) -> Arc<dyn SettingsService>;

    fn reports(&self) -> Arc<dyn ReportService>;

    fn backups(&self) -> Arc<dyn BackupService>;

    fn store(&self) -> Arc<DocumentStore>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    store: Arc<DocumentStore>,
    employee_service: Arc<dyn EmployeeService>,
    beneficiary_service: Arc<dyn BeneficiaryService>,
    assistance_service: Arc<dyn AssistanceService>,
    operation_service: Arc<dyn OperationService>,
    task_service: Arc<dyn TaskService>,
    user_service: Arc<dyn UserService>,
    settings_service: Arc<dyn SettingsService>,
    report_service: Arc<dyn ReportService>,
    backup_service: Arc<dyn BackupService>,
}

impl Services {
    /// Create service container from an opened store and config
    pub fn from_store(store: Arc<DocumentStore>, config: &RecordsServiceConfig) -> Self {
        Self {
            employee_service: Arc::new(EmployeeManager::new(store.clone())),
            beneficiary_service: Arc::new(BeneficiaryManager::new(store.clone())),
            assistance_service: Arc::new(AssistanceManager::new(store.clone())),
            operation_service: Arc::new(OperationManager::new(store.clone())),
            task_service: Arc::new(TaskManager::new(store.clone())),
            user_service: Arc::new(UserManager::new(store.clone())),
            settings_service: Arc::new(SettingsManager::new(store.clone())),
            report_service: Arc::new(ReportManager::new(store.clone())),
            backup_service: Arc::new(BackupManager::new(
                store.clone(),
                config.storage.clone(),
                config.auto_backup_hours,
            )),
            store,
        }
    }

    /// Persist pending changes.
    pub async fn save(&self) -> AppResult<()> {
        self.store.save().await
    }
}

impl ServiceContainer for Services {
    fn employees(&self) -> Arc<dyn EmployeeService> {
        self.employee_service.clone()
    }

    fn beneficiaries(&self) -> Arc<dyn BeneficiaryService> {
        self.beneficiary_service.clone()
    }

    fn assistance(&self) -> Arc<dyn AssistanceService> {
        self.assistance_service.clone()
    }

    fn operations(&self) -> Arc<dyn OperationService> {
        self.operation_service.clone()
    }

    fn tasks(&self) -> Arc<dyn TaskService> {
        self.task_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn settings(&self) -> Arc<dyn SettingsService> {
        self.settings_service.clone()
    }

    fn reports(&self) -> Arc<dyn ReportService> {
        self.report_service.clone()
    }

    fn backups(&self) -> Arc<dyn BackupService> {
        self.backup_service.clone()
    }

    fn store(&self) -> Arc<DocumentStore> {
        self.store.clone()
    }
}

/// Run independent reads concurrently.
pub mod parallel {
    use super::*;
    use futures::try_join;

    /// Both futures run concurrently; the first error wins.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }
}
