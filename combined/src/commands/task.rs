//! Personal task commands. Every task belongs to the signed-in user.

use serde_json::Value;

use common::AppResult;

use super::Context;
use crate::cli::TaskAction;
use crate::output::{field, to_value};

pub async fn execute(action: TaskAction, ctx: &Context<'_>) -> AppResult<Value> {
    let user = ctx.user().await?;
    let tasks = ctx.services.tasks();

    match action {
        TaskAction::List => to_value(&tasks.list_tasks(user.id).await?),
        TaskAction::Add { text } => to_value(&tasks.add_task(user.id, &text).await?),
        TaskAction::Edit { id, text } => to_value(&tasks.edit_task(user.id, id, &text).await?),
        TaskAction::Toggle { id } => to_value(&tasks.toggle_task(user.id, id).await?),
        TaskAction::Delete { id } => {
            tasks.delete_task(user.id, id).await?;
            Ok(field("removed", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use common::AppError;

    #[tokio::test]
    async fn tasks_are_scoped_to_the_signed_in_user() {
        let harness = Harness::signed_in().await;
        let ctx = harness.ctx();

        let mine = execute(TaskAction::List, &ctx).await.unwrap();
        assert_eq!(mine.as_array().unwrap().len(), 2);

        // Task 3 belongs to the second manager
        let err = execute(TaskAction::Toggle { id: 3 }, &ctx).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_) | AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn toggled_task_moves_behind_open_ones() {
        let harness = Harness::signed_in().await;
        let ctx = harness.ctx();

        let added = execute(TaskAction::Add { text: "Call the committee".into() }, &ctx)
            .await
            .unwrap();
        let id = added["id"].as_u64().unwrap();
        let toggled = execute(TaskAction::Toggle { id }, &ctx).await.unwrap();
        assert_eq!(toggled["isCompleted"], true);
    }
}
