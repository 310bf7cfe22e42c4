//! Employee (caseworker) entity.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{MOBILE_RE, NATIONAL_ID_RE};

/// Employee domain entity. `national_id` is the join key to beneficiaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub national_id: String,
    pub phone: String,
    pub governorate: String,
    pub city: String,
    pub area: String,
    #[serde(default)]
    pub is_frozen: bool,
}

impl Employee {
    /// Can this employee take new beneficiaries?
    pub fn is_assignable(&self) -> bool {
        !self.is_frozen
    }

    /// Does the employee cover the given area?
    pub fn serves(&self, governorate: &str, city: &str) -> bool {
        self.governorate == governorate && self.city == city
    }
}

/// Employee form input, shared by add and edit.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmployeeInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(regex(
        path = *NATIONAL_ID_RE,
        message = "National id must be 14 digits starting with 2 or 3"
    ))]
    pub national_id: String,
    #[validate(regex(
        path = *MOBILE_RE,
        message = "Mobile must be 11 digits starting with 010, 011, 012 or 015"
    ))]
    pub phone: String,
    #[validate(length(min = 1, message = "Governorate is required"))]
    pub governorate: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Area is required"))]
    pub area: String,
}

impl EmployeeInput {
    /// Trim every free-text field.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            national_id: self.national_id.trim().to_string(),
            phone: self.phone.trim().to_string(),
            governorate: self.governorate.trim().to_string(),
            city: self.city.trim().to_string(),
            area: self.area.trim().to_string(),
        }
    }

    pub fn into_employee(self, is_frozen: bool) -> Employee {
        Employee {
            name: self.name,
            national_id: self.national_id,
            phone: self.phone,
            governorate: self.governorate,
            city: self.city,
            area: self.area,
            is_frozen,
        }
    }
}

impl From<&Employee> for EmployeeInput {
    fn from(employee: &Employee) -> Self {
        Self {
            name: employee.name.clone(),
            national_id: employee.national_id.clone(),
            phone: employee.phone.clone(),
            governorate: employee.governorate.clone(),
            city: employee.city.clone(),
            area: employee.area.clone(),
        }
    }
}
