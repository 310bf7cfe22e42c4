//! Beneficiary service - aid recipients, their notes and research state.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use common::{AppError, AppResult, OptionExt};
use domain::codes::is_valid_code;
use domain::{Beneficiary, BeneficiaryInput, Document, Note, ResearchStatus, BENEFICIARY_CODE_PREFIX};

use crate::infra::DocumentStore;
use crate::types::{
    compare_text, matches_exact, matches_search, DateRange, Paginated, PaginationParams,
    SortDirection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeneficiarySort {
    Code,
    #[default]
    Name,
    JoinDate,
    Governorate,
    City,
    OperationsCount,
    EmployeeName,
    ResearchStatus,
}

impl FromStr for BeneficiarySort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Self::Code),
            "name" => Ok(Self::Name),
            "join_date" | "join-date" => Ok(Self::JoinDate),
            "governorate" => Ok(Self::Governorate),
            "city" => Ok(Self::City),
            "operations" | "operations_count" => Ok(Self::OperationsCount),
            "employee" | "employee_name" => Ok(Self::EmployeeName),
            "research" | "research_status" => Ok(Self::ResearchStatus),
            other => Err(format!("unknown beneficiary sort key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BeneficiaryQuery {
    pub governorate: Option<String>,
    pub city: Option<String>,
    /// Matches name, national id, phone or code
    pub search: Option<String>,
    pub join_dates: DateRange,
    pub sort: BeneficiarySort,
    pub direction: SortDirection,
    pub pagination: PaginationParams,
}

/// A beneficiary with the values shown next to it in lists.
#[derive(Debug, Clone, Serialize)]
pub struct BeneficiaryRow {
    pub beneficiary: Beneficiary,
    pub employee_name: String,
    /// Accepted operations
    pub operations_count: usize,
    pub research_status: ResearchStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct BeneficiaryDetails {
    pub beneficiary: Beneficiary,
    pub employee_name: String,
    pub accepted_operations: usize,
    /// Sum over accepted and disbursed operations
    pub total_disbursed: f64,
    pub research_status: ResearchStatus,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BeneficiarySaved {
    pub beneficiary: Beneficiary,
    /// Previous code when an invalid or duplicate one was replaced
    pub replaced_code: Option<String>,
}

/// Employee proposed for a new beneficiary in a given area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSuggestion {
    /// `None` is the volunteer
    pub national_id: Option<String>,
    pub name: String,
}

#[async_trait]
pub trait BeneficiaryService: Send + Sync {
    async fn add_beneficiary(&self, input: BeneficiaryInput) -> AppResult<Beneficiary>;

    /// Edit everything but the national id; a broken code is replaced.
    async fn update_beneficiary(
        &self,
        national_id: &str,
        input: BeneficiaryInput,
    ) -> AppResult<BeneficiarySaved>;

    async fn add_note(&self, national_id: &str, text: &str) -> AppResult<Note>;

    /// Returns the number of beneficiaries whose flag changed.
    async fn set_blacklisted(&self, national_ids: &[String], blacklisted: bool) -> AppResult<usize>;

    async fn suggest_employee(&self, governorate: &str, city: &str) -> AppResult<EmployeeSuggestion>;

    async fn get_beneficiary(&self, national_id: &str) -> AppResult<Beneficiary>;

    async fn beneficiary_details(&self, national_id: &str) -> AppResult<BeneficiaryDetails>;

    /// Filtered and sorted rows, unpaginated
    async fn filter_beneficiaries(&self, query: &BeneficiaryQuery) -> AppResult<Vec<BeneficiaryRow>>;

    async fn list_beneficiaries(&self, query: BeneficiaryQuery)
        -> AppResult<Paginated<BeneficiaryRow>>;
}

pub struct BeneficiaryManager {
    store: Arc<DocumentStore>,
}

impl BeneficiaryManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

/// The assigned employee must exist and be active; `None` is always fine.
fn check_assignment(doc: &Document, employee_national_id: Option<&str>) -> AppResult<()> {
    let Some(id) = employee_national_id else {
        return Ok(());
    };
    match doc.employee(id) {
        None => Err(AppError::validation(format!(
            "employee_national_id: Employee {} does not exist",
            id
        ))),
        Some(e) if !e.is_assignable() => Err(AppError::validation(format!(
            "employee_national_id: Employee {} is frozen",
            id
        ))),
        Some(_) => Ok(()),
    }
}

fn accepted_counts(doc: &Document) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for op in doc.operations.iter().filter(|o| o.is_accepted()) {
        *counts.entry(op.beneficiary_national_id.as_str()).or_insert(0) += 1;
    }
    counts
}

pub(crate) fn beneficiary_rows(doc: &Document, query: &BeneficiaryQuery) -> Vec<BeneficiaryRow> {
    let counts = accepted_counts(doc);
    let mut rows: Vec<BeneficiaryRow> = doc
        .beneficiaries
        .iter()
        .filter(|b| matches_exact(query.governorate.as_deref(), &b.governorate))
        .filter(|b| matches_exact(query.city.as_deref(), &b.city))
        .filter(|b| {
            matches_search(
                query.search.as_deref(),
                &[
                    b.name.as_str(),
                    b.national_id.as_str(),
                    b.phone.as_str(),
                    b.code.as_str(),
                ],
            )
        })
        .filter(|b| query.join_dates.contains(&b.join_date))
        .map(|b| BeneficiaryRow {
            employee_name: doc.employee_name(b.employee_national_id.as_deref()),
            operations_count: counts.get(b.national_id.as_str()).copied().unwrap_or(0),
            research_status: b.research_status(),
            beneficiary: b.clone(),
        })
        .collect();

    rows.sort_by(|a, b| {
        let (x, y) = (&a.beneficiary, &b.beneficiary);
        let ordering = match query.sort {
            BeneficiarySort::Code => compare_text(&x.code, &y.code),
            BeneficiarySort::Name => compare_text(&x.name, &y.name),
            BeneficiarySort::JoinDate => x.join_date.cmp(&y.join_date),
            BeneficiarySort::Governorate => compare_text(&x.governorate, &y.governorate),
            BeneficiarySort::City => compare_text(&x.city, &y.city),
            BeneficiarySort::OperationsCount => a.operations_count.cmp(&b.operations_count),
            BeneficiarySort::EmployeeName => compare_text(&a.employee_name, &b.employee_name),
            BeneficiarySort::ResearchStatus => {
                a.research_status.rank().cmp(&b.research_status.rank())
            }
        };
        query.direction.apply(ordering)
    });
    rows
}

#[async_trait]
impl BeneficiaryService for BeneficiaryManager {
    async fn add_beneficiary(&self, input: BeneficiaryInput) -> AppResult<Beneficiary> {
        let input = input.normalized();
        input.check()?;

        let beneficiary = self
            .store
            .apply(move |doc| {
                if doc.beneficiary(&input.national_id).is_some() {
                    return Err(AppError::conflict(format!(
                        "Beneficiary with national id {}",
                        input.national_id
                    )));
                }
                check_assignment(doc, input.employee_national_id.as_deref())?;

                let beneficiary = input.into_beneficiary(doc.next_beneficiary_code());
                doc.beneficiaries.push(beneficiary.clone());
                Ok(beneficiary)
            })
            .await?;

        info!(code = %beneficiary.code, "Beneficiary added");
        Ok(beneficiary)
    }

    async fn update_beneficiary(
        &self,
        national_id: &str,
        input: BeneficiaryInput,
    ) -> AppResult<BeneficiarySaved> {
        let national_id = national_id.trim().to_string();
        let input = input.normalized();
        if input.national_id != national_id {
            return Err(AppError::validation(
                "national_id: The national id of a beneficiary cannot be changed",
            ));
        }
        input.check()?;

        let saved = self
            .store
            .apply(move |doc| {
                let current = doc
                    .beneficiary(&national_id)
                    .ok_or_not_found(format!("Beneficiary {}", national_id))?;
                check_assignment(doc, input.employee_national_id.as_deref())?;

                let code = current.code.clone();
                let duplicate = doc
                    .beneficiaries
                    .iter()
                    .any(|b| b.code == code && b.national_id != national_id);
                let replaced_code = if !is_valid_code(BENEFICIARY_CODE_PREFIX, &code) || duplicate {
                    Some(code)
                } else {
                    None
                };
                let new_code = replaced_code.as_ref().map(|_| doc.next_beneficiary_code());

                let slot = doc
                    .beneficiary_mut(&national_id)
                    .ok_or_not_found(format!("Beneficiary {}", national_id))?;
                slot.apply(input);
                if let Some(code) = new_code {
                    slot.code = code;
                }

                Ok(BeneficiarySaved {
                    beneficiary: slot.clone(),
                    replaced_code,
                })
            })
            .await?;

        if let Some(old) = &saved.replaced_code {
            warn!(old = %old, new = %saved.beneficiary.code, "Beneficiary code replaced");
        }
        info!(code = %saved.beneficiary.code, "Beneficiary updated");
        Ok(saved)
    }

    async fn add_note(&self, national_id: &str, text: &str) -> AppResult<Note> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(AppError::validation("text: Note text is required"));
        }
        let national_id = national_id.trim().to_string();

        self.store
            .apply(move |doc| {
                let beneficiary = doc
                    .beneficiary_mut(&national_id)
                    .ok_or_not_found(format!("Beneficiary {}", national_id))?;
                let note = Note {
                    text,
                    date: Utc::now(),
                };
                beneficiary.notes.push(note.clone());
                Ok(note)
            })
            .await
    }

    async fn set_blacklisted(&self, national_ids: &[String], blacklisted: bool) -> AppResult<usize> {
        let targets: HashSet<String> = national_ids.iter().map(|id| id.trim().to_string()).collect();

        let changed = self
            .store
            .apply(move |doc| {
                if let Some(missing) = targets.iter().find(|id| doc.beneficiary(id).is_none()) {
                    return Err(AppError::not_found(format!("Beneficiary {}", missing)));
                }
                let mut changed = 0;
                for b in doc
                    .beneficiaries
                    .iter_mut()
                    .filter(|b| targets.contains(&b.national_id))
                {
                    if b.is_blacklisted != blacklisted {
                        b.is_blacklisted = blacklisted;
                        changed += 1;
                    }
                }
                Ok(changed)
            })
            .await?;

        info!(changed, blacklisted, "Beneficiary blacklist updated");
        Ok(changed)
    }

    async fn suggest_employee(&self, governorate: &str, city: &str) -> AppResult<EmployeeSuggestion> {
        let doc = self.store.snapshot().await;
        let suggestion = doc
            .employees
            .iter()
            .find(|e| e.is_assignable() && e.serves(governorate.trim(), city.trim()))
            .map(|e| EmployeeSuggestion {
                national_id: Some(e.national_id.clone()),
                name: e.name.clone(),
            })
            .unwrap_or_else(|| EmployeeSuggestion {
                national_id: None,
                name: doc.employee_name(None),
            });
        Ok(suggestion)
    }

    async fn get_beneficiary(&self, national_id: &str) -> AppResult<Beneficiary> {
        self.store
            .snapshot()
            .await
            .beneficiary(national_id.trim())
            .cloned()
            .ok_or_not_found(format!("Beneficiary {}", national_id))
    }

    async fn beneficiary_details(&self, national_id: &str) -> AppResult<BeneficiaryDetails> {
        let doc = self.store.snapshot().await;
        let beneficiary = doc
            .beneficiary(national_id.trim())
            .ok_or_not_found(format!("Beneficiary {}", national_id))?;

        let accepted_operations = doc
            .operations_of(&beneficiary.national_id)
            .filter(|o| o.is_accepted())
            .count();
        let total_disbursed = doc
            .operations_of(&beneficiary.national_id)
            .filter(|o| o.is_disbursed())
            .map(|o| o.amount)
            .sum();

        Ok(BeneficiaryDetails {
            employee_name: doc.employee_name(beneficiary.employee_national_id.as_deref()),
            accepted_operations,
            total_disbursed,
            research_status: beneficiary.research_status(),
            notes: beneficiary.notes_newest_first().into_iter().cloned().collect(),
            beneficiary: beneficiary.clone(),
        })
    }

    async fn filter_beneficiaries(&self, query: &BeneficiaryQuery) -> AppResult<Vec<BeneficiaryRow>> {
        let doc = self.store.snapshot().await;
        Ok(beneficiary_rows(&doc, query))
    }

    async fn list_beneficiaries(
        &self,
        query: BeneficiaryQuery,
    ) -> AppResult<Paginated<BeneficiaryRow>> {
        let rows = self.filter_beneficiaries(&query).await?;
        Ok(Paginated::from_rows(rows, query.pagination))
    }
}
