//! Aid operation commands.

use chrono::Local;
use serde_json::Value;

use common::AppResult;
use domain::{Operation, OperationInput, DATE_FORMAT};
use records_service_lib::service::OperationQuery;
use records_service_lib::types::SortDirection;

use super::Context;
use crate::cli::{OperationAction, OperationFields};
use crate::output::{field, to_value};

/// Overlay the given flags on an existing operation, or on blanks for a new one.
pub fn operation_input(fields: OperationFields, base: Option<&Operation>) -> OperationInput {
    let optional = |given: Option<String>, current: Option<&Option<String>>| {
        given.or_else(|| current.cloned().flatten())
    };

    OperationInput {
        beneficiary_national_id: fields
            .beneficiary
            .or_else(|| base.map(|o| o.beneficiary_national_id.clone()))
            .unwrap_or_default(),
        assistance_id: fields
            .assistance
            .or_else(|| base.map(|o| o.assistance_id))
            .unwrap_or_default(),
        amount: fields
            .amount
            .or_else(|| base.map(|o| o.amount))
            .unwrap_or_default(),
        date: fields
            .date
            .or_else(|| base.map(|o| o.date.clone()))
            .unwrap_or_else(|| Local::now().format(DATE_FORMAT).to_string()),
        committee_number: optional(fields.committee_number, base.map(|o| &o.committee_number)),
        committee_decision_description: optional(
            fields.committee_decision,
            base.map(|o| &o.committee_decision_description),
        ),
        spending_entity: fields
            .spending_entity
            .or_else(|| base.map(|o| o.spending_entity.clone()))
            .unwrap_or_default(),
        details: optional(fields.details, base.map(|o| &o.details)),
        status: fields
            .status
            .or_else(|| base.map(|o| o.status))
            .unwrap_or_default(),
        acceptance_date: optional(fields.acceptance_date, base.map(|o| &o.acceptance_date)),
        pending_date: optional(fields.pending_date, base.map(|o| &o.pending_date)),
        disbursement_status: fields
            .disbursement_status
            .or_else(|| base.and_then(|o| o.disbursement_status)),
        disbursement_date: optional(fields.disbursement_date, base.map(|o| &o.disbursement_date)),
    }
}

pub async fn execute(action: OperationAction, ctx: &Context<'_>) -> AppResult<Value> {
    let operations = ctx.services.operations();

    match action {
        OperationAction::Add(fields) => {
            to_value(&operations.add_operation(operation_input(fields, None)).await?)
        }
        OperationAction::Edit { id, fields } => {
            let current = operations.get_operation(id).await?;
            let saved = operations
                .update_operation(id, operation_input(fields, Some(&current.operation)))
                .await?;
            to_value(&saved)
        }
        OperationAction::Delete { ids } => {
            let removed = match ids.as_slice() {
                [id] => operations.delete_operation(*id).await.map(|_| 1)?,
                _ => operations.delete_operations(&ids).await?,
            };
            Ok(field("removed", removed))
        }
        OperationAction::Show { id } => to_value(&operations.get_operation(id).await?),
        OperationAction::List {
            list,
            status,
            period,
            sort,
            asc,
        } => {
            let query = OperationQuery {
                search: list.search.clone(),
                status,
                dates: period.range(),
                sort,
                direction: if asc {
                    SortDirection::Asc
                } else {
                    SortDirection::Desc
                },
                pagination: list.pagination(),
            };
            to_value(&operations.list_operations(query).await?)
        }
    }
}
