//! Employee service - caseworker records and their assignment cascades.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use common::{AppResult, OptionExt};
use domain::{integrity, validate_input, Employee, EmployeeInput, VOLUNTEER_ID};

use crate::infra::DocumentStore;
use crate::types::{compare_text, matches_search, Paginated, PaginationParams, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmployeeSort {
    #[default]
    Name,
    NationalId,
    Phone,
    Governorate,
    City,
    Area,
}

impl FromStr for EmployeeSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "national_id" | "national-id" => Ok(Self::NationalId),
            "phone" => Ok(Self::Phone),
            "governorate" => Ok(Self::Governorate),
            "city" => Ok(Self::City),
            "area" => Ok(Self::Area),
            other => Err(format!("unknown employee sort key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeQuery {
    /// Matches name, national id or phone
    pub search: Option<String>,
    pub sort: EmployeeSort,
    pub direction: SortDirection,
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeUpdated {
    pub employee: Employee,
    /// Beneficiaries moved to the new national id
    pub beneficiaries_moved: usize,
}

#[async_trait]
pub trait EmployeeService: Send + Sync {
    async fn add_employee(&self, input: EmployeeInput) -> AppResult<Employee>;

    /// Edit an employee; a national id change moves its beneficiaries along.
    async fn update_employee(&self, national_id: &str, input: EmployeeInput)
        -> AppResult<EmployeeUpdated>;

    /// Freeze or unfreeze; freezing hands the beneficiaries to the volunteer.
    /// Returns the number of beneficiaries reassigned.
    async fn set_frozen(&self, national_ids: &[String], freeze: bool) -> AppResult<usize>;

    async fn get_employee(&self, national_id: &str) -> AppResult<Employee>;

    async fn list_employees(&self, query: EmployeeQuery) -> AppResult<Paginated<Employee>>;
}

pub struct EmployeeManager {
    store: Arc<DocumentStore>,
}

impl EmployeeManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EmployeeService for EmployeeManager {
    async fn add_employee(&self, input: EmployeeInput) -> AppResult<Employee> {
        let input = input.normalized();
        validate_input(&input)?;

        let national_id = input.national_id.clone();
        let employee = self
            .store
            .apply(move |doc| {
                integrity::add_employee(doc, input)?;
                doc.employee(&national_id).cloned().ok_or_not_found("Employee")
            })
            .await?;

        info!(national_id = %employee.national_id, "Employee added");
        Ok(employee)
    }

    async fn update_employee(
        &self,
        national_id: &str,
        input: EmployeeInput,
    ) -> AppResult<EmployeeUpdated> {
        let input = input.normalized();
        validate_input(&input)?;

        let original = national_id.to_string();
        let new_id = input.national_id.clone();
        let updated = self
            .store
            .apply(move |doc| {
                let beneficiaries_moved = integrity::update_employee(doc, &original, input)?;
                let employee = doc.employee(&new_id).cloned().ok_or_not_found("Employee")?;
                Ok(EmployeeUpdated {
                    employee,
                    beneficiaries_moved,
                })
            })
            .await?;

        info!(
            national_id = %updated.employee.national_id,
            moved = updated.beneficiaries_moved,
            "Employee updated"
        );
        Ok(updated)
    }

    async fn set_frozen(&self, national_ids: &[String], freeze: bool) -> AppResult<usize> {
        let ids = national_ids.to_vec();
        let reassigned = self
            .store
            .apply(move |doc| Ok(integrity::set_frozen(doc, &ids, freeze)?))
            .await?;

        info!(
            count = national_ids.len(),
            freeze, reassigned, "Employee freeze state changed"
        );
        Ok(reassigned)
    }

    async fn get_employee(&self, national_id: &str) -> AppResult<Employee> {
        self.store
            .snapshot()
            .await
            .employee(national_id.trim())
            .cloned()
            .ok_or_not_found(format!("Employee {}", national_id))
    }

    async fn list_employees(&self, query: EmployeeQuery) -> AppResult<Paginated<Employee>> {
        let doc = self.store.snapshot().await;
        let mut rows: Vec<Employee> = doc
            .employees
            .iter()
            .filter(|e| e.national_id != VOLUNTEER_ID)
            .filter(|e| {
                matches_search(
                    query.search.as_deref(),
                    &[e.name.as_str(), e.national_id.as_str(), e.phone.as_str()],
                )
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                EmployeeSort::Name => compare_text(&a.name, &b.name),
                EmployeeSort::NationalId => a.national_id.cmp(&b.national_id),
                EmployeeSort::Phone => a.phone.cmp(&b.phone),
                EmployeeSort::Governorate => compare_text(&a.governorate, &b.governorate),
                EmployeeSort::City => compare_text(&a.city, &b.city),
                EmployeeSort::Area => compare_text(&a.area, &b.area),
            };
            query.direction.apply(ordering)
        });

        Ok(Paginated::from_rows(rows, query.pagination))
    }
}
