//! Beneficiary commands.

use chrono::Local;
use serde_json::{json, Value};

use common::AppResult;
use domain::{Beneficiary, BeneficiaryInput, DATE_FORMAT};
use records_service_lib::service::BeneficiaryQuery;

use super::Context;
use crate::cli::{BeneficiaryAction, BeneficiaryFields, BeneficiaryFilter};
use crate::output::{field, to_value};

/// `--employee volunteer` assigns the volunteer.
const VOLUNTEER_ARG: &str = "volunteer";

/// Parsed `--employee` flag: `Some(None)` is the volunteer.
fn employee_arg(raw: Option<String>) -> Option<Option<String>> {
    raw.map(|id| {
        let id = id.trim().to_string();
        if id.eq_ignore_ascii_case(VOLUNTEER_ARG) || id.is_empty() {
            None
        } else {
            Some(id)
        }
    })
}

/// Overlay the given flags on an existing beneficiary, or on blanks for a
/// new one. An empty string clears an optional field.
pub fn beneficiary_input(fields: BeneficiaryFields, base: Option<&Beneficiary>) -> BeneficiaryInput {
    let text = |given: Option<String>, current: Option<&String>| {
        given.or_else(|| current.cloned()).unwrap_or_default()
    };
    let optional = |given: Option<String>, current: Option<&Option<String>>| {
        given.or_else(|| current.cloned().flatten())
    };

    let employee_national_id = match employee_arg(fields.employee) {
        Some(choice) => choice,
        None => base.and_then(|b| b.employee_national_id.clone()),
    };

    BeneficiaryInput {
        name: text(fields.name, base.map(|b| &b.name)),
        national_id: text(fields.national_id, base.map(|b| &b.national_id)),
        join_date: fields
            .join_date
            .or_else(|| base.map(|b| b.join_date.clone()))
            .unwrap_or_else(|| Local::now().format(DATE_FORMAT).to_string()),
        phone: text(fields.phone, base.map(|b| &b.phone)),
        alternative_phone: optional(fields.alternative_phone, base.map(|b| &b.alternative_phone)),
        governorate: text(fields.governorate, base.map(|b| &b.governorate)),
        city: text(fields.city, base.map(|b| &b.city)),
        area: text(fields.area, base.map(|b| &b.area)),
        detailed_address: text(fields.address, base.map(|b| &b.detailed_address)),
        job: text(fields.job, base.map(|b| &b.job)),
        family_members: fields
            .family_members
            .or_else(|| base.map(|b| b.family_members))
            .unwrap_or_default(),
        marital_status: fields
            .marital_status
            .or_else(|| base.map(|b| b.marital_status))
            .unwrap_or_default(),
        spouse_name: optional(fields.spouse_name, base.map(|b| &b.spouse_name)),
        employee_national_id,
        is_blacklisted: base.map_or(false, |b| b.is_blacklisted),
        researcher_receipt_date: optional(
            fields.receipt_date,
            base.map(|b| &b.researcher_receipt_date),
        ),
        research_submission_date: optional(
            fields.submission_date,
            base.map(|b| &b.research_submission_date),
        ),
        research_result: fields
            .result
            .or_else(|| base.and_then(|b| b.research_result)),
    }
}

pub fn query(filter: BeneficiaryFilter) -> BeneficiaryQuery {
    BeneficiaryQuery {
        governorate: filter.governorate,
        city: filter.city,
        search: filter.list.search.clone(),
        join_dates: filter.joined.range(),
        sort: filter.sort,
        direction: filter.list.direction(),
        pagination: filter.list.pagination(),
    }
}

pub async fn execute(action: BeneficiaryAction, ctx: &Context<'_>) -> AppResult<Value> {
    let beneficiaries = ctx.services.beneficiaries();

    match action {
        BeneficiaryAction::Add(fields) => {
            let explicit_employee = fields.employee.is_some();
            let mut input = beneficiary_input(fields, None);
            if !explicit_employee {
                let suggestion = beneficiaries
                    .suggest_employee(&input.governorate, &input.city)
                    .await?;
                input.employee_national_id = suggestion.national_id;
            }
            to_value(&beneficiaries.add_beneficiary(input).await?)
        }
        BeneficiaryAction::Edit { target, fields } => {
            let current = beneficiaries.get_beneficiary(&target).await?;
            let saved = beneficiaries
                .update_beneficiary(&target, beneficiary_input(fields, Some(&current)))
                .await?;
            to_value(&saved)
        }
        BeneficiaryAction::Note { national_id, text } => {
            to_value(&beneficiaries.add_note(&national_id, &text).await?)
        }
        BeneficiaryAction::Blacklist { national_ids } => {
            let changed = beneficiaries.set_blacklisted(&national_ids, true).await?;
            Ok(field("blacklisted", changed))
        }
        BeneficiaryAction::Unblacklist { national_ids } => {
            let changed = beneficiaries.set_blacklisted(&national_ids, false).await?;
            Ok(field("unblacklisted", changed))
        }
        BeneficiaryAction::Suggest { governorate, city } => {
            to_value(&beneficiaries.suggest_employee(&governorate, &city).await?)
        }
        BeneficiaryAction::Show { national_id } => {
            to_value(&beneficiaries.beneficiary_details(&national_id).await?)
        }
        BeneficiaryAction::History { national_id } => {
            let rows = ctx.services.operations().beneficiary_history(&national_id).await?;
            Ok(json!({ "national_id": national_id, "operations": to_value(&rows)? }))
        }
        BeneficiaryAction::List { filter } => {
            to_value(&beneficiaries.list_beneficiaries(query(filter)).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use domain::MaritalStatus;

    fn new_fields() -> BeneficiaryFields {
        BeneficiaryFields {
            name: Some("MONA".into()),
            national_id: Some("29906060100666".into()),
            phone: Some("01234567890".into()),
            governorate: Some("القاهرة".into()),
            city: Some("مدينة نصر".into()),
            area: Some("الحي السابع".into()),
            address: Some("12 Street".into()),
            job: Some("Nurse".into()),
            family_members: Some(3),
            marital_status: Some(MaritalStatus::Single),
            ..Default::default()
        }
    }

    #[test]
    fn volunteer_flag_clears_the_assignment() {
        assert_eq!(employee_arg(Some("Volunteer".into())), Some(None));
        assert_eq!(
            employee_arg(Some(" 28501010100111 ".into())),
            Some(Some("28501010100111".into()))
        );
        assert_eq!(employee_arg(None), None);
    }

    #[tokio::test]
    async fn add_uses_the_suggested_employee() {
        let harness = Harness::signed_in().await;
        let added = execute(BeneficiaryAction::Add(new_fields()), &harness.ctx())
            .await
            .unwrap();
        assert_eq!(added["employee_national_id"], "28501010100111");
        assert_eq!(added["code"], "B004");
    }

    #[tokio::test]
    async fn add_outside_any_area_goes_to_the_volunteer() {
        let harness = Harness::signed_in().await;
        let mut fields = new_fields();
        fields.governorate = Some("أسوان".into());
        let added = execute(BeneficiaryAction::Add(fields), &harness.ctx())
            .await
            .unwrap();
        assert_eq!(added["employee_national_id"], domain::VOLUNTEER_ID);
    }

    #[tokio::test]
    async fn edit_with_empty_value_clears_optional_field() {
        let harness = Harness::signed_in().await;
        let ctx = harness.ctx();
        let mut fields = new_fields();
        fields.alternative_phone = Some("01099998888".into());
        execute(BeneficiaryAction::Add(fields), &ctx).await.unwrap();

        execute(
            BeneficiaryAction::Edit {
                target: "29906060100666".into(),
                fields: BeneficiaryFields {
                    alternative_phone: Some(String::new()),
                    ..Default::default()
                },
            },
            &ctx,
        )
        .await
        .unwrap();

        let stored = ctx
            .services
            .beneficiaries()
            .get_beneficiary("29906060100666")
            .await
            .unwrap();
        assert_eq!(stored.alternative_phone, None);
        assert_eq!(stored.job, "Nurse");
    }
}
