//! Referential integrity between employees and beneficiaries.
//!
//! Employees are never deleted. A key change moves every referencing
//! beneficiary along with it; freezing hands the employee's beneficiaries to
//! the volunteer, and unfreezing gives nothing back.

use std::collections::HashSet;

use crate::document::Document;
use crate::employee::EmployeeInput;
use crate::{DomainError, DomainResult};

/// Insert a new employee. The key must be unused.
pub fn add_employee(doc: &mut Document, input: EmployeeInput) -> DomainResult<()> {
    if doc.employee(&input.national_id).is_some() {
        return Err(DomainError::conflict(format!(
            "Employee with national id {}",
            input.national_id
        )));
    }
    doc.employees.push(input.into_employee(false));
    Ok(())
}

/// Replace an employee's data, cascading a national id change.
///
/// Returns the number of beneficiaries moved to the new key.
pub fn update_employee(
    doc: &mut Document,
    original_national_id: &str,
    input: EmployeeInput,
) -> DomainResult<usize> {
    let is_frozen = doc
        .employee(original_national_id)
        .map(|e| e.is_frozen)
        .ok_or_else(|| DomainError::not_found(format!("Employee {}", original_national_id)))?;

    let renamed = input.national_id != original_national_id;
    if renamed && doc.employee(&input.national_id).is_some() {
        return Err(DomainError::conflict(format!(
            "Employee with national id {}",
            input.national_id
        )));
    }

    let new_id = input.national_id.clone();
    if let Some(slot) = doc.employee_mut(original_national_id) {
        *slot = input.into_employee(is_frozen);
    }

    if !renamed {
        return Ok(0);
    }

    let mut moved = 0;
    for b in doc
        .beneficiaries
        .iter_mut()
        .filter(|b| b.is_assigned_to(original_national_id))
    {
        b.employee_national_id = Some(new_id.clone());
        moved += 1;
    }
    Ok(moved)
}

/// Freeze or unfreeze a set of employees.
///
/// Freezing reassigns their beneficiaries to the volunteer and returns how
/// many were reassigned. Unfreezing only flips the flag.
pub fn set_frozen(doc: &mut Document, national_ids: &[String], freeze: bool) -> DomainResult<usize> {
    let targets: HashSet<&str> = national_ids.iter().map(String::as_str).collect();
    if let Some(missing) = targets.iter().find(|id| doc.employee(id).is_none()) {
        return Err(DomainError::not_found(format!("Employee {}", missing)));
    }

    for e in doc
        .employees
        .iter_mut()
        .filter(|e| targets.contains(e.national_id.as_str()))
    {
        e.is_frozen = freeze;
    }

    if !freeze {
        return Ok(0);
    }

    let mut reassigned = 0;
    for b in doc.beneficiaries.iter_mut() {
        let assigned_to_target = b
            .employee_national_id
            .as_deref()
            .is_some_and(|id| targets.contains(id));
        if assigned_to_target {
            b.employee_national_id = None;
            reassigned += 1;
        }
    }
    Ok(reassigned)
}
