//! Assistance type commands.

use serde_json::Value;

use common::AppResult;
use domain::AssistanceTypeInput;
use records_service_lib::service::AssistanceQuery;

use super::Context;
use crate::cli::AssistanceAction;
use crate::output::{field, to_value};

pub async fn execute(action: AssistanceAction, ctx: &Context<'_>) -> AppResult<Value> {
    let assistance = ctx.services.assistance();

    match action {
        AssistanceAction::Add { name } => {
            to_value(&assistance.add_assistance_type(AssistanceTypeInput::new(name)).await?)
        }
        AssistanceAction::Rename { id, name } => to_value(
            &assistance
                .rename_assistance_type(id, AssistanceTypeInput::new(name))
                .await?,
        ),
        AssistanceAction::Delete { ids } => {
            let removed = match ids.as_slice() {
                [id] => assistance.delete_assistance_type(*id).await.map(|_| 1)?,
                _ => assistance.delete_assistance_types(&ids).await?,
            };
            Ok(field("removed", removed))
        }
        AssistanceAction::List { list, sort } => to_value(
            &assistance
                .list_assistance_types(AssistanceQuery {
                    search: list.search.clone(),
                    sort,
                    direction: list.direction(),
                    pagination: list.pagination(),
                })
                .await?,
        ),
    }
}
