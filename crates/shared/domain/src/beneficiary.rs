//! Beneficiary (aid recipient) entity and research tracking.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{DATE_FORMAT, MIN_FAMILY_MEMBERS};
use crate::serde_helpers::{empty_as_none, non_empty, volunteer};
use crate::validation::{FieldErrors, MOBILE_RE, NATIONAL_ID_RE};
use crate::DomainResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    #[default]
    #[serde(alias = "أعزب")]
    Single,
    #[serde(alias = "متزوج")]
    Married,
    #[serde(alias = "مطلق")]
    Divorced,
    #[serde(alias = "أرمل")]
    Widowed,
}

impl MaritalStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "single" | "أعزب" => Some(Self::Single),
            "married" | "متزوج" => Some(Self::Married),
            "divorced" | "مطلق" => Some(Self::Divorced),
            "widowed" | "أرمل" => Some(Self::Widowed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
            Self::Divorced => "divorced",
            Self::Widowed => "widowed",
        }
    }
}

impl std::str::FromStr for MaritalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown marital status '{}'", s))
    }
}

/// Outcome recorded when the researcher submits the case study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchResult {
    #[serde(alias = "مقبول")]
    Accepted,
    #[serde(alias = "مرفوض")]
    Rejected,
}

impl ResearchResult {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "accepted" | "مقبول" => Some(Self::Accepted),
            "rejected" | "مرفوض" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::str::FromStr for ResearchResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown research result '{}'", s))
    }
}

/// Derived progress of the field research on a beneficiary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResearchStatus {
    NotStarted,
    UnderResearch,
    AwaitingResult,
    Accepted,
    Rejected,
}

impl ResearchStatus {
    /// Sort rank: not started, then under research, then submitted.
    pub fn rank(&self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::UnderResearch => 1,
            Self::AwaitingResult | Self::Accepted | Self::Rejected => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::UnderResearch => "under-research",
            Self::AwaitingResult => "awaiting-result",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only follow-up note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Beneficiary domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub code: String,
    pub name: String,
    pub national_id: String,
    pub join_date: String,
    pub phone: String,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub alternative_phone: Option<String>,
    pub governorate: String,
    pub city: String,
    pub area: String,
    pub detailed_address: String,
    pub job: String,
    pub family_members: u32,
    #[serde(default)]
    pub marital_status: MaritalStatus,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub spouse_name: Option<String>,
    /// `None` is the volunteer assignment
    #[serde(with = "volunteer", default)]
    pub employee_national_id: Option<String>,
    #[serde(default)]
    pub is_blacklisted: bool,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub researcher_receipt_date: Option<String>,
    #[serde(with = "empty_as_none", default, skip_serializing_if = "Option::is_none")]
    pub research_submission_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_result: Option<ResearchResult>,
}

impl Beneficiary {
    pub fn research_status(&self) -> ResearchStatus {
        if self.research_submission_date.is_some() {
            match self.research_result {
                Some(ResearchResult::Accepted) => ResearchStatus::Accepted,
                Some(ResearchResult::Rejected) => ResearchStatus::Rejected,
                None => ResearchStatus::AwaitingResult,
            }
        } else if self.researcher_receipt_date.is_some() {
            ResearchStatus::UnderResearch
        } else {
            ResearchStatus::NotStarted
        }
    }

    pub fn is_volunteer_assigned(&self) -> bool {
        self.employee_national_id.is_none()
    }

    pub fn is_assigned_to(&self, employee_national_id: &str) -> bool {
        self.employee_national_id.as_deref() == Some(employee_national_id)
    }

    /// Notes ordered newest first
    pub fn notes_newest_first(&self) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.notes.iter().collect();
        notes.sort_by(|a, b| b.date.cmp(&a.date));
        notes
    }

    /// Apply form input. The national id and code are never touched here.
    pub fn apply(&mut self, input: BeneficiaryInput) {
        self.name = input.name;
        self.join_date = input.join_date;
        self.phone = input.phone;
        self.alternative_phone = input.alternative_phone;
        self.governorate = input.governorate;
        self.city = input.city;
        self.area = input.area;
        self.detailed_address = input.detailed_address;
        self.job = input.job;
        self.family_members = input.family_members;
        self.marital_status = input.marital_status;
        self.spouse_name = input.spouse_name;
        self.employee_national_id = input.employee_national_id;
        self.is_blacklisted = input.is_blacklisted;
        self.researcher_receipt_date = input.researcher_receipt_date;
        self.research_submission_date = input.research_submission_date;
        self.research_result = input.research_result;
    }
}

/// Beneficiary form input, shared by add and edit.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BeneficiaryInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(regex(
        path = *NATIONAL_ID_RE,
        message = "National id must be 14 digits starting with 2 or 3"
    ))]
    pub national_id: String,
    pub join_date: String,
    #[validate(regex(
        path = *MOBILE_RE,
        message = "Mobile must be 11 digits starting with 010, 011, 012 or 015"
    ))]
    pub phone: String,
    #[validate(regex(
        path = *MOBILE_RE,
        message = "Alternative mobile must be 11 digits starting with 010, 011, 012 or 015"
    ))]
    pub alternative_phone: Option<String>,
    #[validate(length(min = 1, message = "Governorate is required"))]
    pub governorate: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Area is required"))]
    pub area: String,
    #[validate(length(min = 1, message = "Detailed address is required"))]
    pub detailed_address: String,
    #[validate(length(min = 1, message = "Job is required"))]
    pub job: String,
    #[validate(range(min = 1, message = "Family members must be at least 1"))]
    pub family_members: u32,
    pub marital_status: MaritalStatus,
    pub spouse_name: Option<String>,
    /// `None` assigns the volunteer
    pub employee_national_id: Option<String>,
    #[serde(default)]
    pub is_blacklisted: bool,
    pub researcher_receipt_date: Option<String>,
    pub research_submission_date: Option<String>,
    pub research_result: Option<ResearchResult>,
}

impl BeneficiaryInput {
    /// Trim text, drop empty optionals and clear fields that do not apply.
    pub fn normalized(self) -> Self {
        let marital_status = self.marital_status;
        let research_submission_date = non_empty(self.research_submission_date);
        let research_result = research_submission_date
            .as_ref()
            .and(self.research_result);

        Self {
            name: self.name.trim().to_string(),
            national_id: self.national_id.trim().to_string(),
            join_date: self.join_date.trim().to_string(),
            phone: self.phone.trim().to_string(),
            alternative_phone: non_empty(self.alternative_phone),
            governorate: self.governorate.trim().to_string(),
            city: self.city.trim().to_string(),
            area: self.area.trim().to_string(),
            detailed_address: self.detailed_address.trim().to_string(),
            job: self.job.trim().to_string(),
            family_members: self.family_members,
            marital_status,
            spouse_name: if marital_status == MaritalStatus::Married {
                non_empty(self.spouse_name)
            } else {
                None
            },
            employee_national_id: non_empty(self.employee_national_id),
            is_blacklisted: self.is_blacklisted,
            researcher_receipt_date: non_empty(self.researcher_receipt_date),
            research_submission_date,
            research_result,
        }
    }

    /// Field rules plus cross-field rules.
    pub fn check(&self) -> DomainResult<()> {
        let mut errors = FieldErrors::new();
        errors.check(!is_date(&self.join_date), "join_date", "Join date is required");
        errors.check(
            self.marital_status == MaritalStatus::Married && self.spouse_name.is_none(),
            "spouse_name",
            "Spouse name is required for married beneficiaries",
        );
        errors.check(
            self.research_submission_date.is_some() && self.research_result.is_none(),
            "research_result",
            "Research result is required once a submission date is set",
        );
        errors.check(
            self.researcher_receipt_date
                .as_deref()
                .is_some_and(|d| !is_date(d)),
            "researcher_receipt_date",
            "Date must be YYYY-MM-DD",
        );
        errors.check(
            self.research_submission_date
                .as_deref()
                .is_some_and(|d| !is_date(d)),
            "research_submission_date",
            "Date must be YYYY-MM-DD",
        );
        errors.into_result_with(self)
    }

    pub fn into_beneficiary(self, code: String) -> Beneficiary {
        Beneficiary {
            code,
            name: self.name,
            national_id: self.national_id,
            join_date: self.join_date,
            phone: self.phone,
            alternative_phone: self.alternative_phone,
            governorate: self.governorate,
            city: self.city,
            area: self.area,
            detailed_address: self.detailed_address,
            job: self.job,
            family_members: self.family_members.max(MIN_FAMILY_MEMBERS),
            marital_status: self.marital_status,
            spouse_name: self.spouse_name,
            employee_national_id: self.employee_national_id,
            is_blacklisted: self.is_blacklisted,
            notes: Vec::new(),
            researcher_receipt_date: self.researcher_receipt_date,
            research_submission_date: self.research_submission_date,
            research_result: self.research_result,
        }
    }
}

impl From<&Beneficiary> for BeneficiaryInput {
    fn from(b: &Beneficiary) -> Self {
        Self {
            name: b.name.clone(),
            national_id: b.national_id.clone(),
            join_date: b.join_date.clone(),
            phone: b.phone.clone(),
            alternative_phone: b.alternative_phone.clone(),
            governorate: b.governorate.clone(),
            city: b.city.clone(),
            area: b.area.clone(),
            detailed_address: b.detailed_address.clone(),
            job: b.job.clone(),
            family_members: b.family_members,
            marital_status: b.marital_status,
            spouse_name: b.spouse_name.clone(),
            employee_national_id: b.employee_national_id.clone(),
            is_blacklisted: b.is_blacklisted,
            researcher_receipt_date: b.researcher_receipt_date.clone(),
            research_submission_date: b.research_submission_date.clone(),
            research_result: b.research_result,
        }
    }
}

/// Strict `YYYY-MM-DD` calendar date
pub fn is_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;

    fn input() -> BeneficiaryInput {
        BeneficiaryInput {
            name: "سارة حسن".to_string(),
            national_id: "29503030100333".to_string(),
            join_date: "2023-01-15".to_string(),
            phone: "01234567890".to_string(),
            alternative_phone: Some(String::new()),
            governorate: "القاهرة".to_string(),
            city: "مدينة نصر".to_string(),
            area: "الحي العاشر".to_string(),
            detailed_address: "عمارة 5".to_string(),
            job: "ربة منزل".to_string(),
            family_members: 4,
            marital_status: MaritalStatus::Married,
            spouse_name: Some("أحمد".to_string()),
            employee_national_id: Some("28501010100111".to_string()),
            is_blacklisted: false,
            researcher_receipt_date: None,
            research_submission_date: None,
            research_result: None,
        }
    }

    #[test]
    fn valid_input_passes_after_normalization() {
        let normalized = input().normalized();
        assert_eq!(normalized.alternative_phone, None);
        assert!(normalized.check().is_ok());
    }

    #[test]
    fn married_requires_spouse_name() {
        let mut raw = input();
        raw.spouse_name = Some("  ".to_string());

        let err = raw.normalized().check().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("spouse_name")));
    }

    #[test]
    fn spouse_name_is_dropped_when_not_married() {
        let mut raw = input();
        raw.marital_status = MaritalStatus::Widowed;

        assert_eq!(raw.normalized().spouse_name, None);
    }

    #[test]
    fn submission_date_requires_result() {
        let mut raw = input();
        raw.research_submission_date = Some("2023-10-25".to_string());

        let err = raw.normalized().check().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("research_result")));
    }

    #[test]
    fn result_without_submission_date_is_cleared() {
        let mut raw = input();
        raw.research_result = Some(ResearchResult::Accepted);

        assert_eq!(raw.normalized().research_result, None);
    }

    #[test]
    fn research_status_follows_dates_and_result() {
        let mut b = input().normalized().into_beneficiary("B001".to_string());
        assert_eq!(b.research_status(), ResearchStatus::NotStarted);

        b.researcher_receipt_date = Some("2023-10-20".to_string());
        assert_eq!(b.research_status(), ResearchStatus::UnderResearch);

        b.research_submission_date = Some("2023-10-25".to_string());
        assert_eq!(b.research_status(), ResearchStatus::AwaitingResult);

        b.research_result = Some(ResearchResult::Rejected);
        assert_eq!(b.research_status(), ResearchStatus::Rejected);
    }

    #[test]
    fn legacy_enum_values_deserialize() {
        let status: MaritalStatus = serde_json::from_str("\"أرمل\"").unwrap();
        assert_eq!(status, MaritalStatus::Widowed);

        let result: ResearchResult = serde_json::from_str("\"مقبول\"").unwrap();
        assert_eq!(result, ResearchResult::Accepted);
    }
}
