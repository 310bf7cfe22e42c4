//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Everything here is shared by the records service, the auth service and
//! the command-line front end.

pub mod assistance;
pub mod beneficiary;
pub mod codes;
pub mod constants;
pub mod document;
pub mod employee;
pub mod error;
pub mod integrity;
pub mod operation;
pub mod password;
pub mod seed;
pub mod serde_helpers;
pub mod task;
pub mod user;
pub mod validation;

pub use assistance::{AssistanceType, AssistanceTypeInput};
pub use beneficiary::{
    Beneficiary, BeneficiaryInput, MaritalStatus, Note, ResearchResult, ResearchStatus,
};
pub use constants::*;
pub use document::Document;
pub use employee::{Employee, EmployeeInput};
pub use error::{DomainError, DomainResult};
pub use operation::{DisbursementStatus, Operation, OperationInput, OperationStatus};
pub use password::Password;
pub use seed::SeedData;
pub use task::Task;
pub use user::{CreateUser, UpdateUser, User, UserProfile, UserRole};
pub use validation::{format_validation_errors, validate_input};
