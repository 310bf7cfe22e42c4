//! Initial data set used for first start, failed loads and restore fallbacks.
//!
//! The built-in set ships with the binary; a deployment can point
//! `CHARITY_SEED_FILE` at a document of the same shape instead. Seed users
//! may carry plaintext passwords; they are hashed when materialized.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::assistance::AssistanceType;
use crate::beneficiary::Beneficiary;
use crate::constants::{DEFAULT_ORGANIZATION_NAME, VOLUNTEER_ID};
use crate::document::Document;
use crate::employee::Employee;
use crate::operation::Operation;
use crate::password::Password;
use crate::task::Task;
use crate::user::User;
use crate::{DomainError, DomainResult};

const BUILTIN_SEED: &str = include_str!("seed.json");

static BUILTIN: Lazy<SeedData> = Lazy::new(|| {
    serde_json::from_str(BUILTIN_SEED).expect("built-in seed document is valid")
});

fn default_organization_name() -> String {
    DEFAULT_ORGANIZATION_NAME.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    #[serde(rename = "organizationName", default = "default_organization_name")]
    pub organization_name: String,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub beneficiaries: Vec<Beneficiary>,
    #[serde(rename = "assistanceTypes", default)]
    pub assistance_types: Vec<AssistanceType>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl SeedData {
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Parse a seed document. A seed without users falls back to the
    /// built-in accounts so a login is always possible.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let mut seed: SeedData = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("seed document: {}", e)))?;
        if seed.users.is_empty() {
            seed.users = BUILTIN.users.clone();
        }
        seed.employees.retain(|e| e.national_id != VOLUNTEER_ID);
        if seed.organization_name.trim().is_empty() {
            seed.organization_name = default_organization_name();
        }
        Ok(seed)
    }

    /// Seed accounts with every plaintext password hashed.
    pub fn users(&self) -> DomainResult<Vec<User>> {
        self.users
            .iter()
            .cloned()
            .map(|mut user| {
                if !Password::is_hash(&user.password) {
                    user.password = Password::new(user.password.trim())?.into_string();
                }
                Ok(user)
            })
            .collect()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn into_document(self) -> DomainResult<Document> {
        let users = self.users()?;
        Ok(Document {
            users,
            employees: self.employees,
            beneficiaries: self.beneficiaries,
            assistance_types: self.assistance_types,
            operations: self.operations,
            tasks: self.tasks,
            organization_name: self.organization_name,
            organization_logo: String::new(),
        })
    }
}
