//! The single persisted aggregate.

use serde::{Deserialize, Serialize};

use crate::assistance::AssistanceType;
use crate::beneficiary::Beneficiary;
use crate::constants::{
    BENEFICIARY_CODE_PREFIX, OPERATION_CODE_PREFIX, UNKNOWN_DISPLAY_NAME, VOLUNTEER_DISPLAY_NAME,
};
use crate::employee::Employee;
use crate::operation::Operation;
use crate::task::Task;
use crate::user::User;
use crate::{codes, DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub users: Vec<User>,
    pub employees: Vec<Employee>,
    pub beneficiaries: Vec<Beneficiary>,
    #[serde(rename = "assistanceTypes")]
    pub assistance_types: Vec<AssistanceType>,
    pub operations: Vec<Operation>,
    pub tasks: Vec<Task>,
    #[serde(rename = "organizationName")]
    pub organization_name: String,
    #[serde(rename = "organizationLogo", default)]
    pub organization_logo: String,
}

impl Document {
    pub fn employee(&self, national_id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.national_id == national_id)
    }

    pub fn employee_mut(&mut self, national_id: &str) -> Option<&mut Employee> {
        self.employees
            .iter_mut()
            .find(|e| e.national_id == national_id)
    }

    pub fn beneficiary(&self, national_id: &str) -> Option<&Beneficiary> {
        self.beneficiaries
            .iter()
            .find(|b| b.national_id == national_id)
    }

    pub fn beneficiary_mut(&mut self, national_id: &str) -> Option<&mut Beneficiary> {
        self.beneficiaries
            .iter_mut()
            .find(|b| b.national_id == national_id)
    }

    pub fn assistance_type(&self, id: u64) -> Option<&AssistanceType> {
        self.assistance_types.iter().find(|a| a.id == id)
    }

    pub fn operation(&self, id: u64) -> Option<&Operation> {
        self.operations.iter().find(|o| o.id == id)
    }

    pub fn user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Display name for a beneficiary's employee reference
    pub fn employee_name(&self, reference: Option<&str>) -> String {
        match reference {
            None => VOLUNTEER_DISPLAY_NAME.to_string(),
            Some(id) => self
                .employee(id)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string()),
        }
    }

    pub fn assistance_name(&self, id: u64) -> String {
        self.assistance_type(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string())
    }

    pub fn beneficiary_name(&self, national_id: &str) -> String {
        self.beneficiary(national_id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string())
    }

    pub fn operations_of<'a>(&'a self, national_id: &'a str) -> impl Iterator<Item = &'a Operation> {
        self.operations
            .iter()
            .filter(move |o| o.beneficiary_national_id == national_id)
    }

    pub fn next_beneficiary_code(&self) -> String {
        codes::next_code(
            BENEFICIARY_CODE_PREFIX,
            self.beneficiaries.iter().map(|b| b.code.as_str()),
        )
    }

    pub fn next_operation_code(&self) -> String {
        codes::next_code(
            OPERATION_CODE_PREFIX,
            self.operations.iter().map(|o| o.code.as_str()),
        )
    }

    pub fn next_assistance_id(&self) -> u64 {
        next_id(self.assistance_types.iter().map(|a| a.id))
    }

    pub fn next_operation_id(&self) -> u64 {
        next_id(self.operations.iter().map(|o| o.id))
    }

    pub fn next_task_id(&self) -> u64 {
        next_id(self.tasks.iter().map(|t| t.id))
    }

    pub fn next_user_id(&self) -> u64 {
        next_id(self.users.iter().map(|u| u.id))
    }

    pub fn set_organization_name(&mut self, name: &str) -> DomainResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::field(
                "organization_name",
                "Organization name is required",
            ));
        }
        self.organization_name = name.to_string();
        Ok(())
    }
}

/// `max + 1`, starting at 1
pub fn next_id<I: IntoIterator<Item = u64>>(ids: I) -> u64 {
    ids.into_iter().max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedData;

    #[test]
    fn wire_names_match_persisted_shape() {
        let doc = SeedData::builtin().into_document().unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("assistanceTypes").is_some());
        assert!(json.get("organizationName").is_some());
        assert!(json.get("organizationLogo").is_some());
        assert_eq!(json["beneficiaries"][0]["employee_national_id"], "28501010100111");
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let doc = SeedData::builtin().into_document().unwrap();
        let json = serde_json::to_string_pretty(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn employee_name_resolves_volunteer_and_unknown() {
        let doc = SeedData::builtin().into_document().unwrap();
        assert_eq!(doc.employee_name(None), VOLUNTEER_DISPLAY_NAME);
        assert_eq!(doc.employee_name(Some("28501010100111")), "أحمد محمود");
        assert_eq!(doc.employee_name(Some("20000000000000")), UNKNOWN_DISPLAY_NAME);
    }

    #[test]
    fn next_ids_follow_maximum() {
        let doc = SeedData::builtin().into_document().unwrap();
        assert_eq!(doc.next_assistance_id(), 4);
        assert_eq!(doc.next_operation_id(), 7);
        assert_eq!(doc.next_beneficiary_code(), "B004");
        assert_eq!(doc.next_operation_code(), "OP007");
        assert_eq!(next_id(Vec::new()), 1);
    }

    #[test]
    fn blank_organization_name_is_rejected() {
        let mut doc = SeedData::builtin().into_document().unwrap();
        assert!(doc.set_organization_name("   ").is_err());
        doc.set_organization_name("  جمعية  ").unwrap();
        assert_eq!(doc.organization_name, "جمعية");
    }
}
