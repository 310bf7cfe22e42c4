//! Dashboard, search and the incentive report.

use std::collections::HashMap;

use serde_json::{json, Value};

use common::AppResult;
use records_service_lib::service::{parallel, Placement};

use super::Context;
use crate::cli::{IncentiveArgs, SearchArgs};
use crate::output::to_value;

pub async fn dashboard(ctx: &Context<'_>) -> AppResult<Value> {
    let user = ctx.user().await?;
    let reports = ctx.services.reports();
    let settings = ctx.services.settings();

    let (stats, organization) =
        parallel::join2(reports.dashboard(user.id), settings.get_settings()).await?;

    Ok(json!({
        "organization": organization.name,
        "user": user.name,
        "stats": to_value(&stats)?,
    }))
}

pub async fn search(args: SearchArgs, ctx: &Context<'_>) -> AppResult<Value> {
    let rows = ctx.services.reports().search(args.by, &args.term).await?;
    to_value(&rows)
}

/// Later flags win when an id is listed twice.
fn placements(internal: Vec<String>, external: Vec<String>) -> HashMap<String, Placement> {
    let internal = internal.into_iter().map(|id| (id, Placement::Internal));
    let external = external.into_iter().map(|id| (id, Placement::External));
    internal
        .chain(external)
        .map(|(id, placement)| (id.trim().to_string(), placement))
        .filter(|(id, _)| !id.is_empty())
        .collect()
}

pub async fn incentive(args: IncentiveArgs, ctx: &Context<'_>) -> AppResult<Value> {
    let placements = placements(args.internal, args.external);
    let report = ctx
        .services
        .reports()
        .incentive(&args.employee, args.period.range(), &placements)
        .await?;
    to_value(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PeriodArgs;
    use crate::commands::testing::Harness;
    use records_service_lib::service::SearchTarget;

    #[test]
    fn external_wins_over_internal() {
        let map = placements(
            vec!["1".into(), " 2 ".into()],
            vec!["2".into(), "".into()],
        );
        assert_eq!(map.len(), 2);
        assert_eq!(map["1"], Placement::Internal);
        assert_eq!(map["2"], Placement::External);
    }

    #[tokio::test]
    async fn dashboard_counts_records_and_own_tasks() {
        let harness = Harness::signed_in().await;
        let board = dashboard(&harness.ctx()).await.unwrap();
        assert_eq!(board["stats"]["employees"], 2);
        assert_eq!(board["stats"]["beneficiaries"], 3);
        assert_eq!(board["stats"]["operations"], 6);
        assert_eq!(board["stats"]["tasks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_search_finds_nothing() {
        let harness = Harness::signed_in().await;
        let found = search(
            SearchArgs {
                term: "   ".into(),
                by: SearchTarget::Employee,
            },
            &harness.ctx(),
        )
        .await
        .unwrap();
        assert_eq!(found.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn incentive_counts_classified_researches() {
        let harness = Harness::signed_in().await;
        let report = incentive(
            IncentiveArgs {
                employee: "28501010100111".into(),
                period: PeriodArgs {
                    from: Some("2023-10-01".into()),
                    to: Some("2023-10-31".into()),
                },
                internal: vec!["29503030100333".into()],
                external: vec![],
            },
            &harness.ctx(),
        )
        .await
        .unwrap();
        assert_eq!(report["summary"]["internal_count"], 1);
        assert_eq!(report["summary"]["external_count"], 0);
        assert_eq!(report["summary"]["total"], 1);
    }
}
