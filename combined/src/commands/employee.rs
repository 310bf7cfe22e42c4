//! Employee commands.

use serde_json::{json, Value};

use common::AppResult;
use domain::{Employee, EmployeeInput};
use records_service_lib::service::EmployeeQuery;

use super::Context;
use crate::cli::{EmployeeAction, EmployeeFields};
use crate::output::{field, to_value};

/// Overlay the given flags on an existing employee, or on blanks for a new one.
pub fn employee_input(fields: EmployeeFields, base: Option<&Employee>) -> EmployeeInput {
    let keep = |given: Option<String>, current: Option<&String>| {
        given.or_else(|| current.cloned()).unwrap_or_default()
    };
    EmployeeInput {
        name: keep(fields.name, base.map(|e| &e.name)),
        national_id: keep(fields.national_id, base.map(|e| &e.national_id)),
        phone: keep(fields.phone, base.map(|e| &e.phone)),
        governorate: keep(fields.governorate, base.map(|e| &e.governorate)),
        city: keep(fields.city, base.map(|e| &e.city)),
        area: keep(fields.area, base.map(|e| &e.area)),
    }
}

pub async fn execute(action: EmployeeAction, ctx: &Context<'_>) -> AppResult<Value> {
    let employees = ctx.services.employees();

    match action {
        EmployeeAction::Add(fields) => {
            let employee = employees.add_employee(employee_input(fields, None)).await?;
            to_value(&employee)
        }
        EmployeeAction::Edit { target, fields } => {
            let current = employees.get_employee(&target).await?;
            let updated = employees
                .update_employee(&target, employee_input(fields, Some(&current)))
                .await?;
            to_value(&updated)
        }
        EmployeeAction::Freeze { national_ids } => {
            let moved = employees.set_frozen(&national_ids, true).await?;
            Ok(json!({ "frozen": national_ids.len(), "beneficiaries_moved": moved }))
        }
        EmployeeAction::Unfreeze { national_ids } => {
            employees.set_frozen(&national_ids, false).await?;
            Ok(field("unfrozen", national_ids.len()))
        }
        EmployeeAction::Show { national_id } => to_value(&employees.get_employee(&national_id).await?),
        EmployeeAction::List { list, sort } => {
            let page = employees
                .list_employees(EmployeeQuery {
                    search: list.search.clone(),
                    sort,
                    direction: list.direction(),
                    pagination: list.pagination(),
                })
                .await?;
            to_value(&page)
        }
    }
}
