//! Operation (aid disbursement) entity.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::beneficiary::is_date;
use crate::serde_helpers::{empty_as_none, non_empty};
use crate::validation::FieldErrors;
use crate::DomainResult;

/// Committee decision on an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    #[serde(alias = "مقبوله")]
    Accepted,
    #[serde(alias = "مرفوضه")]
    Rejected,
    #[default]
    #[serde(alias = "معلقة")]
    Pending,
}

impl OperationStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "accepted" | "مقبوله" => Some(Self::Accepted),
            "rejected" | "مرفوضه" => Some(Self::Rejected),
            "pending" | "معلقة" => Some(Self::Pending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown operation status '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisbursementStatus {
    #[serde(alias = "تم الصرف")]
    Disbursed,
    #[serde(alias = "جاري التنفيذ")]
    InProgress,
}

impl DisbursementStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "disbursed" | "تم الصرف" => Some(Self::Disbursed),
            "in_progress" | "جاري التنفيذ" => Some(Self::InProgress),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disbursed => "disbursed",
            Self::InProgress => "in_progress",
        }
    }
}

impl std::fmt::Display for DisbursementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DisbursementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown disbursement status '{}'", s))
    }
}

/// Operation domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: u64,
    pub code: String,
    pub beneficiary_national_id: String,
    pub assistance_id: u64,
    pub amount: f64,
    pub date: String,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub committee_number: Option<String>,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub committee_decision_description: Option<String>,
    pub spending_entity: String,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub status: OperationStatus,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub acceptance_date: Option<String>,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub pending_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disbursement_status: Option<DisbursementStatus>,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub disbursement_date: Option<String>,
}

impl Operation {
    pub fn is_accepted(&self) -> bool {
        self.status == OperationStatus::Accepted
    }

    /// Accepted and paid out; counts toward a beneficiary's disbursed total.
    pub fn is_disbursed(&self) -> bool {
        self.is_accepted() && self.disbursement_status == Some(DisbursementStatus::Disbursed)
    }

    pub fn apply(&mut self, input: OperationInput) {
        self.beneficiary_national_id = input.beneficiary_national_id;
        self.assistance_id = input.assistance_id;
        self.amount = input.amount;
        self.date = input.date;
        self.committee_number = input.committee_number;
        self.committee_decision_description = input.committee_decision_description;
        self.spending_entity = input.spending_entity;
        self.details = input.details;
        self.status = input.status;
        self.acceptance_date = input.acceptance_date;
        self.pending_date = input.pending_date;
        self.disbursement_status = input.disbursement_status;
        self.disbursement_date = input.disbursement_date;
    }
}

/// Operation form input, shared by add and edit.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OperationInput {
    #[validate(length(min = 1, message = "Beneficiary is required"))]
    pub beneficiary_national_id: String,
    pub assistance_id: u64,
    pub amount: f64,
    pub date: String,
    pub committee_number: Option<String>,
    pub committee_decision_description: Option<String>,
    #[validate(length(min = 1, message = "Spending entity is required"))]
    pub spending_entity: String,
    pub details: Option<String>,
    pub status: OperationStatus,
    pub acceptance_date: Option<String>,
    pub pending_date: Option<String>,
    pub disbursement_status: Option<DisbursementStatus>,
    pub disbursement_date: Option<String>,
}

impl OperationInput {
    /// Trim text and clear dates that do not belong to the chosen status.
    pub fn normalized(self) -> Self {
        let accepted = self.status == OperationStatus::Accepted;
        let pending = self.status == OperationStatus::Pending;
        let disbursement_status = if accepted { self.disbursement_status } else { None };

        Self {
            beneficiary_national_id: self.beneficiary_national_id.trim().to_string(),
            assistance_id: self.assistance_id,
            amount: self.amount,
            date: self.date.trim().to_string(),
            committee_number: non_empty(self.committee_number),
            committee_decision_description: non_empty(self.committee_decision_description),
            spending_entity: self.spending_entity.trim().to_string(),
            details: non_empty(self.details),
            status: self.status,
            acceptance_date: non_empty(self.acceptance_date).filter(|_| accepted),
            pending_date: non_empty(self.pending_date).filter(|_| pending),
            disbursement_status,
            disbursement_date: non_empty(self.disbursement_date)
                .filter(|_| disbursement_status.is_some()),
        }
    }

    pub fn check(&self) -> DomainResult<()> {
        let mut errors = FieldErrors::new();
        errors.check(
            !(self.amount.is_finite() && self.amount > 0.0),
            "amount",
            "Amount must be greater than zero",
        );
        errors.check(!is_date(&self.date), "date", "Date is required");
        errors.check(
            self.status == OperationStatus::Accepted && !is_some_date(&self.acceptance_date),
            "acceptance_date",
            "Acceptance date is required",
        );
        errors.check(
            self.status == OperationStatus::Pending && !is_some_date(&self.pending_date),
            "pending_date",
            "Pending date is required",
        );
        errors.check(
            self.disbursement_status.is_some() && !is_some_date(&self.disbursement_date),
            "disbursement_date",
            "Disbursement date is required once a disbursement status is set",
        );
        errors.into_result_with(self)
    }

    pub fn into_operation(self, id: u64, code: String) -> Operation {
        let mut operation = Operation {
            id,
            code,
            beneficiary_national_id: String::new(),
            assistance_id: 0,
            amount: 0.0,
            date: String::new(),
            committee_number: None,
            committee_decision_description: None,
            spending_entity: String::new(),
            details: None,
            status: OperationStatus::Pending,
            acceptance_date: None,
            pending_date: None,
            disbursement_status: None,
            disbursement_date: None,
        };
        operation.apply(self);
        operation
    }
}

impl From<&Operation> for OperationInput {
    fn from(op: &Operation) -> Self {
        Self {
            beneficiary_national_id: op.beneficiary_national_id.clone(),
            assistance_id: op.assistance_id,
            amount: op.amount,
            date: op.date.clone(),
            committee_number: op.committee_number.clone(),
            committee_decision_description: op.committee_decision_description.clone(),
            spending_entity: op.spending_entity.clone(),
            details: op.details.clone(),
            status: op.status,
            acceptance_date: op.acceptance_date.clone(),
            pending_date: op.pending_date.clone(),
            disbursement_status: op.disbursement_status,
            disbursement_date: op.disbursement_date.clone(),
        }
    }
}

fn is_some_date(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(is_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;

    fn input(status: OperationStatus) -> OperationInput {
        OperationInput {
            beneficiary_national_id: "29503030100333".to_string(),
            assistance_id: 1,
            amount: 500.0,
            date: "2023-02-01".to_string(),
            committee_number: Some("C1".to_string()),
            committee_decision_description: None,
            spending_entity: "تبرعات أهل الخير".to_string(),
            details: Some(" ".to_string()),
            status,
            acceptance_date: Some("2023-02-02".to_string()),
            pending_date: Some("2023-02-03".to_string()),
            disbursement_status: Some(DisbursementStatus::Disbursed),
            disbursement_date: Some("2023-02-05".to_string()),
        }
    }

    #[test]
    fn accepted_keeps_acceptance_and_disbursement_dates() {
        let op = input(OperationStatus::Accepted).normalized();
        assert!(op.check().is_ok());
        assert_eq!(op.acceptance_date.as_deref(), Some("2023-02-02"));
        assert_eq!(op.pending_date, None);
        assert_eq!(op.disbursement_status, Some(DisbursementStatus::Disbursed));
        assert_eq!(op.details, None);
    }

    #[test]
    fn pending_clears_acceptance_and_disbursement() {
        let op = input(OperationStatus::Pending).normalized();
        assert!(op.check().is_ok());
        assert_eq!(op.acceptance_date, None);
        assert_eq!(op.pending_date.as_deref(), Some("2023-02-03"));
        assert_eq!(op.disbursement_status, None);
        assert_eq!(op.disbursement_date, None);
    }

    #[test]
    fn rejected_keeps_no_status_dates() {
        let op = input(OperationStatus::Rejected).normalized();
        assert!(op.check().is_ok());
        assert_eq!(op.acceptance_date, None);
        assert_eq!(op.pending_date, None);
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let mut raw = input(OperationStatus::Rejected);
        raw.amount = 0.0;

        let err = raw.normalized().check().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("amount")));
    }

    #[test]
    fn accepted_requires_acceptance_date() {
        let mut raw = input(OperationStatus::Accepted);
        raw.acceptance_date = None;

        let err = raw.normalized().check().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("acceptance_date")));
    }

    #[test]
    fn disbursement_status_requires_date() {
        let mut raw = input(OperationStatus::Accepted);
        raw.disbursement_date = Some(String::new());

        let err = raw.normalized().check().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("disbursement_date")));
    }

    #[test]
    fn legacy_statuses_deserialize() {
        let status: OperationStatus = serde_json::from_str("\"معلقة\"").unwrap();
        assert_eq!(status, OperationStatus::Pending);

        let disbursed: DisbursementStatus = serde_json::from_str("\"تم الصرف\"").unwrap();
        assert_eq!(disbursed, DisbursementStatus::Disbursed);
        assert_eq!(
            serde_json::to_string(&DisbursementStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }
}
