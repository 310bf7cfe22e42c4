//! Typed views of raw records.
//!
//! Ids come back as `Option<u64>`; `None` marks an id the reconciler repairs.

use chrono::Utc;

use domain::serde_helpers::volunteer;
use domain::{
    AssistanceType, Beneficiary, DisbursementStatus, Employee, MaritalStatus, Operation,
    OperationStatus, ResearchResult, Task, User, UserRole, MIN_FAMILY_MEMBERS,
};

use super::coerce::{self, RawRecord};

pub fn employee(r: &RawRecord) -> Employee {
    Employee {
        name: coerce::text(r, "name"),
        national_id: coerce::text(r, "national_id").trim().to_string(),
        phone: coerce::text(r, "phone"),
        governorate: coerce::text(r, "governorate"),
        city: coerce::text(r, "city"),
        area: coerce::text(r, "area"),
        is_frozen: coerce::flag(r, "is_frozen"),
    }
}

pub fn beneficiary(r: &RawRecord) -> Beneficiary {
    let family_members = coerce::number(r, "family_members")
        .filter(|n| *n >= f64::from(MIN_FAMILY_MEMBERS))
        .map(|n| n.min(f64::from(u32::MAX)) as u32)
        .unwrap_or(MIN_FAMILY_MEMBERS);

    Beneficiary {
        code: coerce::text(r, "code"),
        name: coerce::text(r, "name"),
        national_id: coerce::text(r, "national_id").trim().to_string(),
        join_date: coerce::required_date(r, "join_date"),
        phone: coerce::text(r, "phone"),
        alternative_phone: coerce::optional_text(r, "alternative_phone"),
        governorate: coerce::text(r, "governorate"),
        city: coerce::text(r, "city"),
        area: coerce::text(r, "area"),
        detailed_address: coerce::text(r, "detailed_address"),
        job: coerce::text(r, "job"),
        family_members,
        marital_status: coerce::choice(r, "marital_status", MaritalStatus::parse)
            .unwrap_or_default(),
        spouse_name: coerce::optional_text(r, "spouse_name"),
        employee_national_id: volunteer::from_wire(&coerce::text(r, "employee_national_id")),
        is_blacklisted: coerce::flag(r, "is_blacklisted"),
        notes: coerce::notes(r, "notes"),
        researcher_receipt_date: coerce::date(r, "researcher_receipt_date"),
        research_submission_date: coerce::date(r, "research_submission_date"),
        research_result: coerce::choice(r, "research_result", ResearchResult::parse),
    }
}

pub fn assistance_type(r: &RawRecord) -> (Option<u64>, AssistanceType) {
    (
        coerce::id(r, "id"),
        AssistanceType {
            id: 0,
            name: coerce::text(r, "name"),
        },
    )
}

pub fn operation(r: &RawRecord) -> (Option<u64>, Operation) {
    let op = Operation {
        id: 0,
        code: coerce::text(r, "code"),
        beneficiary_national_id: coerce::text(r, "beneficiary_national_id").trim().to_string(),
        assistance_id: coerce::id(r, "assistance_id").unwrap_or(0),
        amount: coerce::number(r, "amount").unwrap_or(0.0),
        date: coerce::required_date(r, "date"),
        committee_number: coerce::optional_text(r, "committee_number"),
        committee_decision_description: coerce::optional_text(r, "committee_decision_description"),
        spending_entity: coerce::text(r, "spending_entity"),
        details: coerce::optional_text(r, "details"),
        status: coerce::choice(r, "status", OperationStatus::parse).unwrap_or_default(),
        acceptance_date: coerce::date(r, "acceptance_date"),
        pending_date: coerce::date(r, "pending_date"),
        disbursement_status: coerce::choice(r, "disbursement_status", DisbursementStatus::parse),
        disbursement_date: coerce::date(r, "disbursement_date"),
    };
    (coerce::id(r, "id"), op)
}

/// User record plus whether it carried a role at all.
pub struct RawUser {
    pub id: Option<u64>,
    pub user: User,
    pub has_role: bool,
}

pub fn user(r: &RawRecord) -> RawUser {
    let username = coerce::text(r, "username");
    let role_text = coerce::optional_text(r, "role");
    let has_role = role_text.is_some();
    let role = match role_text {
        Some(text) => UserRole::parse(&text).unwrap_or(UserRole::User),
        None => UserRole::migrate_for(&username),
    };

    RawUser {
        id: coerce::id(r, "id"),
        user: User {
            id: 0,
            name: coerce::text(r, "name"),
            mobile: coerce::text(r, "mobile"),
            username,
            password: coerce::text(r, "password"),
            role,
        },
        has_role,
    }
}

pub fn task(r: &RawRecord) -> (Option<u64>, Task) {
    let now = Utc::now();
    let created_at = coerce::timestamp(r, "createdAt").unwrap_or(now);
    let task = Task {
        id: 0,
        user_id: coerce::id(r, "userId").unwrap_or(0),
        text: coerce::text(r, "text"),
        is_completed: coerce::flag(r, "isCompleted"),
        created_at,
        updated_at: coerce::timestamp(r, "updatedAt").unwrap_or(created_at),
    };
    (coerce::id(r, "id"), task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn legacy_beneficiary_values_are_mapped() {
        let b = beneficiary(&record(json!({
            "code": "B001",
            "national_id": 29503030100333u64,
            "marital_status": "أرمل",
            "employee_national_id": "VOLUNTEER",
            "family_members": "0",
            "research_result": "مقبول",
            "research_submission_date": "2023-10-25T00:00:00.000Z",
            "is_blacklisted": "false"
        })));

        assert_eq!(b.national_id, "29503030100333");
        assert_eq!(b.marital_status, MaritalStatus::Widowed);
        assert_eq!(b.employee_national_id, None);
        assert_eq!(b.family_members, 1);
        assert_eq!(b.research_result, Some(ResearchResult::Accepted));
        assert_eq!(b.research_submission_date.as_deref(), Some("2023-10-25"));
        assert!(!b.is_blacklisted);
    }

    #[test]
    fn unknown_operation_status_falls_back_to_pending() {
        let (id, op) = operation(&record(json!({"id": "x", "status": "??", "amount": "250"})));
        assert_eq!(id, None);
        assert_eq!(op.status, OperationStatus::Pending);
        assert_eq!(op.amount, 250.0);
        assert_eq!(op.disbursement_status, None);
    }

    #[test]
    fn user_role_migration_only_applies_when_missing() {
        let missing = user(&record(json!({"id": 1, "username": "Tarek", "password": "123"})));
        assert!(!missing.has_role);
        assert_eq!(missing.user.role, UserRole::Manager);

        let unknown = user(&record(json!({"id": 2, "username": "Admin", "role": "boss"})));
        assert!(unknown.has_role);
        assert_eq!(unknown.user.role, UserRole::User);

        let legacy = user(&record(json!({"id": 3, "username": "sara", "role": "مدير"})));
        assert_eq!(legacy.user.role, UserRole::Manager);
    }
}
