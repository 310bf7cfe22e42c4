//! Account administration. The service enforces the manager role.

use serde_json::Value;

use common::AppResult;
use domain::{CreateUser, UpdateUser};
use records_service_lib::service::UserQuery;

use super::Context;
use crate::cli::UserAction;
use crate::output::{field, to_value};

pub async fn execute(action: UserAction, ctx: &Context<'_>) -> AppResult<Value> {
    let actor = ctx.user().await?;
    let users = ctx.services.users();

    match action {
        UserAction::List { list, sort } => {
            let query = UserQuery {
                search: list.search.clone(),
                sort,
                direction: list.direction(),
                pagination: list.pagination(),
            };
            to_value(&users.list_users(&actor, query).await?)
        }
        UserAction::Show { id } => to_value(&users.get_user(&actor, id).await?),
        UserAction::Add {
            name,
            mobile,
            username,
            password,
            role,
        } => {
            let input = CreateUser {
                name,
                mobile,
                username,
                password,
                role,
            };
            to_value(&users.create_user(&actor, input).await?)
        }
        UserAction::Edit {
            id,
            name,
            mobile,
            role,
        } => {
            let current = users.get_user(&actor, id).await?;
            let input = UpdateUser {
                name: name.unwrap_or(current.name),
                mobile: mobile.unwrap_or(current.mobile),
                role: role.unwrap_or(current.role),
            };
            to_value(&users.update_user(&actor, id, input).await?)
        }
        UserAction::ResetPassword { id, password } => {
            users.reset_password(&actor, id, &password).await?;
            Ok(Value::String("Password updated".to_string()))
        }
        UserAction::Delete { ids } => {
            let removed = match ids.as_slice() {
                [id] => users.delete_user(&actor, *id).await.map(|_| 1)?,
                _ => users.delete_users(&actor, &ids).await?,
            };
            Ok(field("removed", removed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use domain::UserRole;

    #[tokio::test]
    async fn plain_users_cannot_manage_accounts() {
        let harness = Harness::signed_in().await;
        let ctx = harness.ctx();
        execute(
            UserAction::Add {
                name: "Clerk".into(),
                mobile: "01155556666".into(),
                username: "clerk".into(),
                password: "secret".into(),
                role: UserRole::User,
            },
            &ctx,
        )
        .await
        .unwrap();

        ctx.auth.login("clerk", "secret").await.unwrap();
        let err = execute(UserAction::Show { id: 1 }, &ctx).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn edit_keeps_fields_that_were_not_given() {
        let harness = Harness::signed_in().await;
        let edited = execute(
            UserAction::Edit {
                id: 2,
                name: None,
                mobile: Some("01277778888".into()),
                role: None,
            },
            &harness.ctx(),
        )
        .await
        .unwrap();
        assert_eq!(edited["name"], "Tarek User");
        assert_eq!(edited["mobile"], "01277778888");
        assert_eq!(edited["role"], "manager");
    }

    #[tokio::test]
    async fn admin_cannot_be_deleted() {
        let harness = Harness::signed_in().await;
        let err = execute(UserAction::Delete { ids: vec![1] }, &harness.ctx())
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
