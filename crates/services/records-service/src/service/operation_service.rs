//! Operation service - aid disbursements.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use common::{AppError, AppResult, OptionExt};
use domain::codes::is_valid_code;
use domain::{Document, Operation, OperationInput, OperationStatus, OPERATION_CODE_PREFIX};

use crate::infra::DocumentStore;
use crate::types::{
    compare_text, matches_search, DateRange, Paginated, PaginationParams, SortDirection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationSort {
    Code,
    BeneficiaryName,
    #[default]
    Date,
    Status,
    Amount,
}

impl FromStr for OperationSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Self::Code),
            "beneficiary" | "beneficiary_name" => Ok(Self::BeneficiaryName),
            "date" => Ok(Self::Date),
            "status" => Ok(Self::Status),
            "amount" => Ok(Self::Amount),
            other => Err(format!("unknown operation sort key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OperationQuery {
    /// Matches beneficiary name, beneficiary national id or code
    pub search: Option<String>,
    pub status: Option<OperationStatus>,
    pub dates: DateRange,
    pub sort: OperationSort,
    pub direction: SortDirection,
    pub pagination: PaginationParams,
}

impl Default for OperationQuery {
    /// Newest first
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            dates: DateRange::default(),
            sort: OperationSort::Date,
            direction: SortDirection::Desc,
            pagination: PaginationParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationRow {
    pub operation: Operation,
    pub beneficiary_name: String,
    pub assistance_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationSaved {
    pub operation: Operation,
    /// Previous code when an invalid or duplicate one was replaced
    pub replaced_code: Option<String>,
}

#[async_trait]
pub trait OperationService: Send + Sync {
    async fn add_operation(&self, input: OperationInput) -> AppResult<Operation>;

    async fn update_operation(&self, id: u64, input: OperationInput) -> AppResult<OperationSaved>;

    async fn delete_operation(&self, id: u64) -> AppResult<()>;

    /// Returns the number of operations removed.
    async fn delete_operations(&self, ids: &[u64]) -> AppResult<usize>;

    async fn get_operation(&self, id: u64) -> AppResult<OperationRow>;

    /// Filtered and sorted rows, unpaginated
    async fn filter_operations(&self, query: &OperationQuery) -> AppResult<Vec<OperationRow>>;

    async fn list_operations(&self, query: OperationQuery) -> AppResult<Paginated<OperationRow>>;

    /// All operations of one beneficiary, newest first
    async fn beneficiary_history(&self, national_id: &str) -> AppResult<Vec<OperationRow>>;
}

pub struct OperationManager {
    store: Arc<DocumentStore>,
}

impl OperationManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

/// Checks that need the document: beneficiary and assistance type.
fn check_references(doc: &Document, input: &OperationInput) -> AppResult<()> {
    match doc.beneficiary(&input.beneficiary_national_id) {
        None => {
            return Err(AppError::validation(format!(
                "beneficiary_national_id: No beneficiary with national id {}",
                input.beneficiary_national_id
            )))
        }
        Some(b) if b.is_blacklisted => {
            return Err(AppError::validation(format!(
                "beneficiary_national_id: Beneficiary {} is blacklisted",
                b.name
            )))
        }
        Some(_) => {}
    }
    if doc.assistance_type(input.assistance_id).is_none() {
        return Err(AppError::validation(format!(
            "assistance_id: Assistance type {} does not exist",
            input.assistance_id
        )));
    }
    Ok(())
}

fn row(doc: &Document, op: &Operation) -> OperationRow {
    OperationRow {
        beneficiary_name: doc.beneficiary_name(&op.beneficiary_national_id),
        assistance_name: doc.assistance_name(op.assistance_id),
        operation: op.clone(),
    }
}

pub(crate) fn operation_rows(doc: &Document, query: &OperationQuery) -> Vec<OperationRow> {
    let mut rows: Vec<OperationRow> = doc
        .operations
        .iter()
        .filter(|o| query.status.map_or(true, |s| o.status == s))
        .filter(|o| query.dates.contains(&o.date))
        .map(|o| row(doc, o))
        .filter(|r| {
            matches_search(
                query.search.as_deref(),
                &[
                    r.beneficiary_name.as_str(),
                    r.operation.beneficiary_national_id.as_str(),
                    r.operation.code.as_str(),
                ],
            )
        })
        .collect();

    rows.sort_by(|a, b| {
        let (x, y) = (&a.operation, &b.operation);
        let ordering = match query.sort {
            OperationSort::Code => compare_text(&x.code, &y.code),
            OperationSort::BeneficiaryName => compare_text(&a.beneficiary_name, &b.beneficiary_name),
            OperationSort::Date => x.date.cmp(&y.date),
            OperationSort::Status => x.status.as_str().cmp(y.status.as_str()),
            OperationSort::Amount => x.amount.total_cmp(&y.amount),
        };
        query.direction.apply(ordering)
    });
    rows
}

#[async_trait]
impl OperationService for OperationManager {
    async fn add_operation(&self, input: OperationInput) -> AppResult<Operation> {
        let input = input.normalized();
        input.check()?;

        let operation = self
            .store
            .apply(move |doc| {
                check_references(doc, &input)?;
                let operation = input.into_operation(doc.next_operation_id(), doc.next_operation_code());
                doc.operations.push(operation.clone());
                Ok(operation)
            })
            .await?;

        info!(code = %operation.code, amount = operation.amount, "Operation added");
        Ok(operation)
    }

    async fn update_operation(&self, id: u64, input: OperationInput) -> AppResult<OperationSaved> {
        let input = input.normalized();
        input.check()?;

        let saved = self
            .store
            .apply(move |doc| {
                let code = doc
                    .operation(id)
                    .map(|o| o.code.clone())
                    .ok_or_not_found(format!("Operation {}", id))?;
                check_references(doc, &input)?;

                let duplicate = doc.operations.iter().any(|o| o.code == code && o.id != id);
                let replaced_code = if !is_valid_code(OPERATION_CODE_PREFIX, &code) || duplicate {
                    Some(code)
                } else {
                    None
                };
                let new_code = replaced_code.as_ref().map(|_| doc.next_operation_code());

                let slot = doc
                    .operations
                    .iter_mut()
                    .find(|o| o.id == id)
                    .ok_or_not_found(format!("Operation {}", id))?;
                slot.apply(input);
                if let Some(code) = new_code {
                    slot.code = code;
                }

                Ok(OperationSaved {
                    operation: slot.clone(),
                    replaced_code,
                })
            })
            .await?;

        if let Some(old) = &saved.replaced_code {
            warn!(old = %old, new = %saved.operation.code, "Operation code replaced");
        }
        info!(code = %saved.operation.code, "Operation updated");
        Ok(saved)
    }

    async fn delete_operation(&self, id: u64) -> AppResult<()> {
        self.store
            .apply(move |doc| {
                let before = doc.operations.len();
                doc.operations.retain(|o| o.id != id);
                if doc.operations.len() == before {
                    return Err(AppError::not_found(format!("Operation {}", id)));
                }
                Ok(())
            })
            .await?;

        info!(id, "Operation deleted");
        Ok(())
    }

    async fn delete_operations(&self, ids: &[u64]) -> AppResult<usize> {
        let targets: HashSet<u64> = ids.iter().copied().collect();
        let removed = self
            .store
            .apply(move |doc| {
                let before = doc.operations.len();
                doc.operations.retain(|o| !targets.contains(&o.id));
                Ok(before - doc.operations.len())
            })
            .await?;

        info!(removed, "Operations deleted");
        Ok(removed)
    }

    async fn get_operation(&self, id: u64) -> AppResult<OperationRow> {
        let doc = self.store.snapshot().await;
        doc.operation(id)
            .map(|o| row(&doc, o))
            .ok_or_not_found(format!("Operation {}", id))
    }

    async fn filter_operations(&self, query: &OperationQuery) -> AppResult<Vec<OperationRow>> {
        let doc = self.store.snapshot().await;
        Ok(operation_rows(&doc, query))
    }

    async fn list_operations(&self, query: OperationQuery) -> AppResult<Paginated<OperationRow>> {
        let rows = self.filter_operations(&query).await?;
        Ok(Paginated::from_rows(rows, query.pagination))
    }

    async fn beneficiary_history(&self, national_id: &str) -> AppResult<Vec<OperationRow>> {
        let doc = self.store.snapshot().await;
        let national_id = national_id.trim();
        doc.beneficiary(national_id)
            .ok_or_not_found(format!("Beneficiary {}", national_id))?;

        let mut rows: Vec<OperationRow> = doc.operations_of(national_id).map(|o| row(&doc, o)).collect();
        rows.sort_by(|a, b| b.operation.date.cmp(&a.operation.date));
        Ok(rows)
    }
}
