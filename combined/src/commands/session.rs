//! Sign in, sign out and the current user.

use serde_json::Value;
use tracing::info;

use common::AppResult;

use super::Context;
use crate::cli::LoginArgs;
use crate::output::to_value;

pub async fn login(args: LoginArgs, ctx: &Context<'_>) -> AppResult<Value> {
    let profile = ctx.auth.login(&args.username, &args.password).await?;
    info!(username = %profile.username, "Welcome");
    to_value(&profile)
}

pub async fn logout(ctx: &Context<'_>) -> AppResult<Value> {
    ctx.auth.logout().await?;
    Ok(Value::String("Signed out".to_string()))
}

pub async fn whoami(ctx: &Context<'_>) -> AppResult<Value> {
    to_value(&ctx.user().await?)
}
